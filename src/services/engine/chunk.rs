// Engine-native result chunk
//
// One bounded unit of row data produced by a single fetch. A chunk is
// consumed by value when exported, so it cannot be read again afterwards.

use anyhow::{anyhow, Context, Result};
use datafusion::arrow::array::{Array, ArrayRef, RecordBatch};

/// One fetched chunk: a vector per column plus the row count
#[derive(Debug)]
pub struct DataChunk {
    columns: Vec<ArrayRef>,
    cardinality: usize,
}

impl DataChunk {
    pub fn new(columns: Vec<ArrayRef>, cardinality: usize) -> Self {
        Self {
            columns,
            cardinality,
        }
    }

    /// Wrap a record batch without copying its buffers
    pub fn from_record_batch(batch: &RecordBatch) -> Self {
        Self::new(batch.columns().to_vec(), batch.num_rows())
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Option<&ArrayRef> {
        self.columns.get(idx)
    }

    /// Check the chunk's internal consistency
    ///
    /// Every vector must hold exactly `cardinality` values and pass full
    /// Arrow validation (offsets, UTF-8, null counts, child lengths).
    pub fn verify(&self) -> Result<()> {
        for (idx, column) in self.columns.iter().enumerate() {
            if column.len() != self.cardinality {
                return Err(anyhow!(
                    "Chunk column {} holds {} values, expected {}",
                    idx,
                    column.len(),
                    self.cardinality
                ));
            }

            column
                .to_data()
                .validate_full()
                .with_context(|| format!("Chunk column {} failed validation", idx))?;
        }

        Ok(())
    }

    /// Give up ownership of the column vectors
    pub fn into_columns(self) -> Vec<ArrayRef> {
        self.columns
    }
}
