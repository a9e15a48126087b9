// DataFusion session setup
//
// Builds the SessionContext and the tokio runtime that drives it. The
// bridge is synchronous, so every engine call is a `block_on` on this runtime.

use anyhow::{Context, Result};
use datafusion::prelude::{SessionConfig, SessionContext};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use crate::config::EngineConfig;

/// Creates sessions and runtimes from the engine configuration
///
/// # Example
/// ```rust,ignore
/// let manager = DataFusionSessionManager::new(EngineConfig::default());
/// let connection = manager.connect()?;
/// let statement = Statement::create(&connection, "SELECT 1")?;
/// ```
#[derive(Debug, Clone)]
pub struct DataFusionSessionManager {
    config: EngineConfig,
}

impl DataFusionSessionManager {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create a new DataFusion SessionContext
    ///
    /// # Returns
    /// A context using the configured batch size and partition count
    pub fn create_session(&self) -> SessionContext {
        let session_config = SessionConfig::new()
            .with_batch_size(self.config.batch_size.max(1))
            .with_target_partitions(self.config.target_partitions.max(1));

        SessionContext::new_with_config(session_config)
    }

    /// Create the runtime that drives engine futures
    ///
    /// # Errors
    /// Returns error if the operating system refuses to spawn worker threads
    pub fn create_runtime(&self) -> Result<Arc<Runtime>> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads.max(1))
            .thread_name("bridge-engine")
            .enable_all()
            .build()
            .context("Failed to start engine runtime")?;

        Ok(Arc::new(runtime))
    }

    /// Open a connection with a fresh session and runtime
    pub fn connect(&self) -> Result<super::DataFusionConnection> {
        let runtime = self.create_runtime()?;
        let connection = super::DataFusionConnection::new(self.create_session(), runtime);
        connection.set_timezone(self.config.timezone.as_deref());

        tracing::debug!(
            "Opened engine session: batch_size={}, target_partitions={}, worker_threads={}",
            self.config.batch_size,
            self.config.target_partitions,
            self.config.worker_threads
        );

        Ok(connection)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_uses_configured_batch_size() {
        let manager = DataFusionSessionManager::new(EngineConfig {
            batch_size: 128,
            target_partitions: 2,
            worker_threads: 1,
            timezone: None,
        });

        let ctx = manager.create_session();
        let state = ctx.state();
        assert_eq!(state.config().batch_size(), 128);
        assert_eq!(state.config().target_partitions(), 2);
    }

    #[test]
    fn test_connect_applies_timezone() {
        let manager = DataFusionSessionManager::new(EngineConfig {
            batch_size: 8,
            target_partitions: 1,
            worker_threads: 1,
            timezone: Some("America/New_York".to_string()),
        });

        let connection = manager.connect().unwrap();
        assert_eq!(
            crate::services::engine::EngineConnection::timezone(&connection),
            Some("America/New_York".to_string())
        );
    }
}
