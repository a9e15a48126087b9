// ResultMaterializer
//
// Turns an executed engine cursor into one columnar batch: derive the
// runtime schema, fetch chunks, verify them, export them through the C Data
// Interface and import the result.

use anyhow::{Context, Result};
use datafusion::arrow::compute::concat_batches;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::arrow::record_batch::RecordBatch;

use crate::config::FetchMode;
use crate::services::engine::ResultCursor;
use crate::services::export::export_chunk;
use crate::services::schema_builder::SchemaBuilder;

/// One execution's worth of columnar data
#[derive(Debug, Clone)]
pub struct MaterializedResult {
    /// Schema attached to `batch`, as imported
    pub schema: SchemaRef,
    pub batch: RecordBatch,
    /// Number of engine chunks folded into `batch`
    pub chunk_count: usize,
}

impl MaterializedResult {
    pub fn row_count(&self) -> usize {
        self.batch.num_rows()
    }
}

/// Materializes engine cursors into record batches
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMaterializer {
    fetch_mode: FetchMode,
}

impl ResultMaterializer {
    pub fn new(fetch_mode: FetchMode) -> Self {
        Self { fetch_mode }
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Drain `cursor` into a single batch
    ///
    /// An exhausted cursor yields a zero-row batch under the full schema.
    ///
    /// # Errors
    /// Returns error if the engine fails to produce a chunk, a chunk fails
    /// verification, or the export handoff fails. No partial batch escapes.
    pub fn materialize<C: ResultCursor>(&self, cursor: &mut C) -> Result<MaterializedResult> {
        let timezone = cursor.timezone();
        let schema = SchemaBuilder::build(&cursor.columns(), timezone.as_deref());

        let mut batches = Vec::new();
        while let Some(chunk) = cursor.fetch_chunk().context("Failed to fetch result chunk")? {
            chunk.verify().context("Result chunk failed verification")?;

            let batch = export_chunk(chunk, &schema)?.import()?;
            batches.push(batch);

            if self.fetch_mode == FetchMode::SingleChunk {
                tracing::debug!("Single-chunk fetch, remaining chunks are not read");
                break;
            }
        }

        let chunk_count = batches.len();
        let batch = match chunk_count {
            0 => RecordBatch::new_empty(schema),
            1 => batches.remove(0),
            _ => {
                let imported = batches[0].schema();
                concat_batches(&imported, &batches).context("Failed to concatenate chunks")?
            }
        };

        tracing::debug!(
            "Materialized {} rows from {} chunk(s)",
            batch.num_rows(),
            chunk_count
        );

        Ok(MaterializedResult {
            schema: batch.schema(),
            batch,
            chunk_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnDescriptor, LogicalType};
    use crate::services::engine::testing::{int_chunk, ScriptedConnection, Step};
    use crate::services::engine::{EngineConnection, PreparedHandle};
    use datafusion::arrow::array::{AsArray, Int32Array};
    use datafusion::arrow::datatypes::{DataType, Int32Type};
    use std::sync::Arc;

    fn connection() -> ScriptedConnection {
        ScriptedConnection::new(vec![ColumnDescriptor::new("n", LogicalType::Integer)])
    }

    fn run(connection: &ScriptedConnection, mode: FetchMode) -> Result<MaterializedResult> {
        let prepared = connection.prepare("SELECT n FROM t")?;
        let mut cursor = prepared.execute(&[])?;
        ResultMaterializer::new(mode).materialize(&mut cursor)
    }

    fn values(result: &MaterializedResult) -> Vec<i32> {
        result
            .batch
            .column(0)
            .as_primitive::<Int32Type>()
            .values()
            .to_vec()
    }

    #[test]
    fn test_single_chunk() {
        let connection = connection().with_run(vec![int_chunk(vec![1, 2, 3])]);
        let result = run(&connection, FetchMode::AllChunks).unwrap();

        assert_eq!(result.chunk_count, 1);
        assert_eq!(result.row_count(), 3);
        assert_eq!(values(&result), vec![1, 2, 3]);
        assert_eq!(result.schema.field(0).data_type(), &DataType::Int32);
    }

    #[test]
    fn test_all_chunks_are_concatenated() {
        let connection = connection().with_run(vec![
            int_chunk(vec![1, 2]),
            int_chunk(vec![3]),
            int_chunk(vec![4, 5]),
        ]);
        let result = run(&connection, FetchMode::AllChunks).unwrap();

        assert_eq!(result.chunk_count, 3);
        assert_eq!(values(&result), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_single_chunk_mode_drops_later_chunks() {
        let connection = connection().with_run(vec![int_chunk(vec![1, 2]), int_chunk(vec![3])]);
        let result = run(&connection, FetchMode::SingleChunk).unwrap();

        assert_eq!(result.chunk_count, 1);
        assert_eq!(values(&result), vec![1, 2]);
    }

    #[test]
    fn test_exhausted_cursor_yields_empty_batch() {
        let connection = connection().with_run(vec![]);
        let result = run(&connection, FetchMode::AllChunks).unwrap();

        assert_eq!(result.chunk_count, 0);
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.schema.fields().len(), 1);
        assert_eq!(result.schema.field(0).name(), "n");
    }

    #[test]
    fn test_zero_row_chunk_is_not_a_failure() {
        let connection = connection().with_run(vec![int_chunk(vec![])]);
        let result = run(&connection, FetchMode::SingleChunk).unwrap();

        assert_eq!(result.chunk_count, 1);
        assert_eq!(result.row_count(), 0);
    }

    #[test]
    fn test_mid_stream_failure_exposes_no_batch() {
        let connection = connection().with_run(vec![
            int_chunk(vec![1]),
            Step::Fail("disk full".to_string()),
        ]);
        let err = run(&connection, FetchMode::AllChunks).unwrap_err();

        assert!(format!("{:#}", err).contains("disk full"));
    }

    #[test]
    fn test_corrupt_chunk_fails_fast() {
        let connection = connection().with_run(vec![Step::Chunk(
            vec![Arc::new(Int32Array::from(vec![1, 2]))],
            5,
        )]);
        let err = run(&connection, FetchMode::AllChunks).unwrap_err();

        assert!(format!("{:#}", err).contains("verification"));
    }
}
