// Statement batch reader
//
// Adapts a Statement to Arrow's RecordBatchReader so a streaming transport
// can pull the result without knowing about the statement lifecycle.

use datafusion::arrow::datatypes::SchemaRef;
use datafusion::arrow::error::ArrowError;
use datafusion::arrow::record_batch::{RecordBatch, RecordBatchReader};

use crate::services::engine::PreparedHandle;
use crate::services::statement::Statement;

/// Yields a statement's materialized result exactly once
///
/// The statement is executed lazily on the first `next` unless the caller
/// has already executed it.
pub struct StatementBatchReader<P: PreparedHandle> {
    statement: Statement<P>,
    schema: SchemaRef,
    needs_execute: bool,
    done: bool,
}

impl<P: PreparedHandle> StatementBatchReader<P> {
    /// Wrap an unexecuted statement, advertising its declared schema
    pub fn new(statement: Statement<P>) -> Self {
        let schema = statement.get_schema();
        Self::with_schema(statement, schema, true)
    }

    /// Wrap a statement whose result is already materialized
    pub fn from_executed(statement: Statement<P>) -> Self {
        let schema = statement
            .result_schema()
            .unwrap_or_else(|| statement.get_schema());
        Self::with_schema(statement, schema, false)
    }

    /// Wrap `statement`, advertising `schema` instead of the derived one
    pub fn with_schema(statement: Statement<P>, schema: SchemaRef, needs_execute: bool) -> Self {
        Self {
            statement,
            schema,
            needs_execute,
            done: false,
        }
    }

    /// Give the statement back, e.g. to execute it again
    pub fn into_statement(self) -> Statement<P> {
        self.statement
    }
}

impl<P: PreparedHandle> Iterator for StatementBatchReader<P> {
    type Item = Result<RecordBatch, ArrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.done = true;

        if self.needs_execute {
            self.needs_execute = false;
            if let Err(e) = self.statement.execute() {
                return Some(Err(ArrowError::ExternalError(Box::new(e))));
            }
        }

        Some(
            self.statement
                .get_result()
                .map_err(|e| ArrowError::ExternalError(Box::new(e))),
        )
    }
}

impl<P: PreparedHandle> RecordBatchReader for StatementBatchReader<P> {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
