// Parameter binding helpers
//
// Positional parameters arrive from the RPC layer as Arrow batches; every
// cell becomes one positional value, read row by row.

use anyhow::{Context, Result};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::scalar::ScalarValue;

/// Flatten `batch` into positional parameter values in row-major order
pub fn parameters_from_batch(batch: &RecordBatch) -> Result<Vec<ScalarValue>> {
    let mut values = Vec::with_capacity(batch.num_rows() * batch.num_columns());

    for row_idx in 0..batch.num_rows() {
        for (col_idx, column) in batch.columns().iter().enumerate() {
            let value = ScalarValue::try_from_array(column, row_idx).with_context(|| {
                format!("Failed to read parameter at row {}, column {}", row_idx, col_idx)
            })?;
            values.push(value);
        }
    }

    Ok(values)
}
