// Query engine abstraction
//
// The bridge consumes the SQL engine as an opaque prepare/execute/fetch
// capability. These traits are that seam; `services::datafusion` provides
// the production implementation.

pub mod chunk;
#[cfg(test)]
pub(crate) mod testing;

pub use chunk::DataChunk;

use anyhow::Result;
use datafusion::scalar::ScalarValue;

use crate::models::{ColumnDescriptor, LogicalType};

/// A live engine connection able to prepare statements
pub trait EngineConnection {
    type Prepared: PreparedHandle;

    /// Parse and plan `sql`. The error carries the engine's diagnostic.
    fn prepare(&self, sql: &str) -> Result<Self::Prepared>;

    /// Current session timezone, if the session defines one
    fn timezone(&self) -> Option<String>;
}

/// A parsed-and-planned query owned by exactly one statement
pub trait PreparedHandle {
    type Cursor: ResultCursor;

    /// Declared output columns, known before execution
    fn columns(&self) -> Vec<ColumnDescriptor>;

    /// Declared parameter types in placeholder order (`$1`, `$2`, ...)
    fn parameter_types(&self) -> Vec<LogicalType>;

    /// Timezone of the owning connection at the time of the call
    fn timezone(&self) -> Option<String>;

    /// Run the statement with positional parameter values
    fn execute(&self, parameters: &[ScalarValue]) -> Result<Self::Cursor>;
}

/// An executed statement's result stream
pub trait ResultCursor {
    /// Runtime output columns
    fn columns(&self) -> Vec<ColumnDescriptor>;

    /// Session timezone the result was produced under
    fn timezone(&self) -> Option<String>;

    /// Fetch the next chunk; `Ok(None)` once the result is exhausted
    fn fetch_chunk(&mut self) -> Result<Option<DataChunk>>;
}
