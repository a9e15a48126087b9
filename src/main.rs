use datafusion::arrow::util::pretty::pretty_format_batches;
use tracing::{error, info};

use sql_columnar_bridge::config::Config;
use sql_columnar_bridge::logging::init_tracing;
use sql_columnar_bridge::services::datafusion::DataFusionSessionManager;
use sql_columnar_bridge::services::statement::Statement;

const USAGE: &str = "usage: sql-columnar-bridge [--config <file>] <sql>...";

// The engine connection owns its runtime and blocks on it, so main stays
// synchronous.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config = if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            return Err(USAGE.into());
        }
        let path = args.remove(1);
        args.remove(0);
        Config::from_file(&path)?
    } else {
        Config::from_env()?
    };

    init_tracing(&config.logging);

    if args.is_empty() {
        error!("No SQL given");
        return Err(USAGE.into());
    }

    let connection = DataFusionSessionManager::new(config.engine.clone()).connect()?;

    for sql in &args {
        let mut statement = Statement::create_with_config(&connection, sql, &config.execution)
            .map_err(|e| {
                error!("{}", e);
                e
            })?;
        statement.execute()?;

        let batch = statement.get_result()?;
        info!("{} rows, {} columns", batch.num_rows(), batch.num_columns());
        println!("{}", pretty_format_batches(&[batch])?);
    }

    Ok(())
}
