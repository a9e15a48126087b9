// Statement
//
// Public lifecycle object handed to the RPC layer:
// Created -> Prepared -> (Bound) -> Executed, each Execute replacing the
// previous result. A failed prepare never yields a Statement.

use datafusion::arrow::datatypes::SchemaRef;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::scalar::ScalarValue;

use crate::config::ExecutionConfig;
use crate::error::{BridgeError, Result};
use crate::services::engine::{EngineConnection, PreparedHandle};
use crate::services::materializer::{MaterializedResult, ResultMaterializer};
use crate::services::parameters::parameters_from_batch;
use crate::services::schema_builder::SchemaBuilder;

/// A prepared statement and its most recent result
///
/// Not meant for concurrent use: callers serialize access per statement or
/// give each statement its own connection.
pub struct Statement<P: PreparedHandle> {
    sql: String,
    prepared: P,
    parameters: Vec<ScalarValue>,
    materializer: ResultMaterializer,
    result: Option<MaterializedResult>,
}

impl<P: PreparedHandle> Statement<P> {
    /// Prepare `sql` on `connection` with the default execution settings
    ///
    /// # Errors
    /// Returns `BridgeError::Prepare` carrying the SQL and the engine's
    /// diagnostic when the engine cannot parse or plan the statement
    pub fn create<C>(connection: &C, sql: &str) -> Result<Self>
    where
        C: EngineConnection<Prepared = P>,
    {
        Self::create_with_config(connection, sql, &ExecutionConfig::default())
    }

    /// Prepare `sql` on `connection`
    ///
    /// # Arguments
    /// * `connection` - Live engine connection
    /// * `sql` - SQL text, passed to the engine untouched
    /// * `config` - Fetch mode and query logging settings
    pub fn create_with_config<C>(connection: &C, sql: &str, config: &ExecutionConfig) -> Result<Self>
    where
        C: EngineConnection<Prepared = P>,
    {
        if config.log_queries {
            tracing::info!("Client running SQL command: \n{};\n", sql);
        }

        let prepared = connection.prepare(sql).map_err(|e| {
            tracing::debug!("Prepare failed: {:#}", e);
            BridgeError::prepare(sql, e)
        })?;

        Ok(Self {
            sql: sql.to_string(),
            prepared,
            parameters: Vec::new(),
            materializer: ResultMaterializer::new(config.fetch_mode),
            result: None,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Replace the bound parameters with positional `parameters`
    ///
    /// # Errors
    /// Returns `BridgeError::Bind` if the count differs from the number of
    /// placeholders in the prepared statement
    pub fn bind(&mut self, parameters: Vec<ScalarValue>) -> Result<()> {
        let expected = self.prepared.parameter_types().len();
        if parameters.len() != expected {
            return Err(BridgeError::Bind(format!(
                "statement '{}' expects {} parameter(s), got {}",
                self.sql,
                expected,
                parameters.len()
            )));
        }

        self.parameters = parameters;
        Ok(())
    }

    /// Bind every cell of `batch`, row by row, as positional parameters
    pub fn bind_record_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        let parameters =
            parameters_from_batch(batch).map_err(|e| BridgeError::Bind(format!("{:#}", e)))?;
        self.bind(parameters)
    }

    pub fn parameters(&self) -> &[ScalarValue] {
        &self.parameters
    }

    /// Execute with the bound parameters and store the materialized batch
    ///
    /// The previous result is discarded first, so after a failure
    /// `get_result` reports `NotExecuted` rather than stale data.
    pub fn execute(&mut self) -> Result<()> {
        self.result = None;

        let mut cursor = self
            .prepared
            .execute(&self.parameters)
            .map_err(|e| BridgeError::execution(&self.sql, e))?;

        let materialized = self
            .materializer
            .materialize(&mut cursor)
            .map_err(|e| BridgeError::execution(&self.sql, e))?;

        tracing::debug!(
            "Executed '{}': {} rows, {} columns",
            self.sql,
            materialized.row_count(),
            materialized.schema.fields().len()
        );

        self.result = Some(materialized);
        Ok(())
    }

    /// Execute and report the row count of the resulting batch
    pub fn execute_update(&mut self) -> Result<i64> {
        self.execute()?;
        let rows = self.get_result()?.num_rows();
        Ok(rows as i64)
    }

    /// The batch produced by the last successful `execute`
    pub fn get_result(&self) -> Result<RecordBatch> {
        self.result
            .as_ref()
            .map(|result| result.batch.clone())
            .ok_or_else(|| BridgeError::NotExecuted {
                sql: self.sql.clone(),
            })
    }

    /// Schema attached to the last materialized batch, if any
    pub fn result_schema(&self) -> Option<SchemaRef> {
        self.result.as_ref().map(|result| result.schema.clone())
    }

    /// Schema of the declared output, available before execution
    ///
    /// Uses the owning connection's timezone at the time of the call.
    pub fn get_schema(&self) -> SchemaRef {
        let timezone = self.prepared.timezone();
        SchemaBuilder::build(&self.prepared.columns(), timezone.as_deref())
    }

    /// Schema describing the statement's positional parameters
    pub fn parameter_schema(&self) -> SchemaRef {
        SchemaBuilder::parameter_schema(&self.prepared.parameter_types())
    }

    /// Underlying engine handle, for collaborators that need engine access
    pub fn native_handle(&self) -> &P {
        &self.prepared
    }
}

/// Prepare and execute `sql` once, returning the result's row count
pub fn execute_update<C: EngineConnection>(connection: &C, sql: &str) -> Result<i64> {
    Statement::create(connection, sql)?.execute_update()
}
