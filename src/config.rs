use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Rows per engine chunk
    pub batch_size: usize,
    /// Number of partitions for parallel execution
    pub target_partitions: usize,
    /// Worker threads of the runtime driving the engine
    pub worker_threads: usize,
    /// Session timezone reported to schema derivation
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    pub fetch_mode: FetchMode,
    /// Log every prepared SQL text at info level
    pub log_queries: bool,
}

/// How many engine chunks one execution materializes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// First chunk only; later chunks are dropped
    SingleChunk,
    /// Drain the cursor and concatenate every chunk
    #[default]
    AllChunks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub style: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            fetch_mode: FetchMode::default(),
            log_queries: false,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            target_partitions: num_cpus::get(),
            worker_threads: num_cpus::get(),
            timezone: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            style: "auto".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    /// Load a configuration file (TOML, YAML or JSON by extension), layered
    /// over the defaults. Environment variables are not consulted.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let file = config::File::from(path.as_ref());
        Self::defaults()?
            .add_source(file)
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let cpus = num_cpus::get() as i64;

        config::Config::builder()
            .set_default("engine.batch_size", 8192)?
            .set_default("engine.target_partitions", cpus)?
            .set_default("engine.worker_threads", cpus)?
            .set_default("execution.fetch_mode", "all_chunks")?
            .set_default("execution.log_queries", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.style", "auto")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        // Try to load from .env file
        let _ = dotenv::dotenv();

        let mut builder = Self::defaults()?;

        if let Ok(batch_size) = env::var("BRIDGE_BATCH_SIZE") {
            builder = builder.set_override("engine.batch_size", batch_size)?;
        }

        if let Ok(partitions) = env::var("BRIDGE_TARGET_PARTITIONS") {
            builder = builder.set_override("engine.target_partitions", partitions)?;
        }

        if let Ok(threads) = env::var("BRIDGE_WORKER_THREADS") {
            builder = builder.set_override("engine.worker_threads", threads)?;
        }

        if let Ok(timezone) = env::var("BRIDGE_TIMEZONE") {
            builder = builder.set_override("engine.timezone", Some(timezone))?;
        }

        if let Ok(fetch_mode) = env::var("BRIDGE_FETCH_MODE") {
            builder = builder.set_override("execution.fetch_mode", fetch_mode)?;
        }

        if let Ok(log_queries) = env::var("BRIDGE_LOG_QUERIES") {
            builder = builder.set_override("execution.log_queries", log_queries)?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        if let Ok(log_style) = env::var("RUST_LOG_STYLE") {
            builder = builder.set_override("logging.style", log_style)?;
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        // Clear environment variables for this test
        env::remove_var("BRIDGE_BATCH_SIZE");
        env::remove_var("BRIDGE_FETCH_MODE");
        env::remove_var("BRIDGE_TIMEZONE");

        let config = Config::from_env();
        assert!(config.is_ok());

        let config = config.unwrap();
        assert_eq!(config.engine.batch_size, 8192);
        assert_eq!(config.execution.fetch_mode, FetchMode::AllChunks);
        assert!(config.engine.timezone.is_none());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[engine]
batch_size = 16
timezone = "Europe/Berlin"

[execution]
fetch_mode = "single_chunk"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.engine.batch_size, 16);
        assert_eq!(config.engine.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(config.execution.fetch_mode, FetchMode::SingleChunk);
        assert!(!config.execution.log_queries);
        assert_eq!(config.logging.level, "info");
    }
}
