// Chunk export
//
// Moves an engine chunk into the columnar format through the Arrow C Data
// Interface. Columns whose native layout already matches the mapped type
// hand their buffers over untouched; the rest are conformed first.

use anyhow::{anyhow, Context, Result};
use arrow::ffi::{from_ffi, FFI_ArrowArray, FFI_ArrowSchema};
use datafusion::arrow::array::{new_null_array, Array, ArrayRef, AsArray, StructArray};
use datafusion::arrow::compute::{can_cast_types, cast};
use datafusion::arrow::datatypes::{
    DataType, Decimal128Type, DurationMicrosecondType, Int64Type, IntervalDayTimeType,
    IntervalMonthDayNanoType, IntervalUnit, IntervalYearMonthType, Schema, SchemaRef, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use datafusion::arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::sync::Arc;

use crate::services::engine::DataChunk;

const MICROS_PER_DAY: i64 = 86_400_000_000;
/// Months count as 30 days when flattened to a duration
const MICROS_PER_MONTH: i64 = 30 * MICROS_PER_DAY;

/// A chunk after export: C Data Interface structures awaiting import
///
/// Produced by [`export_chunk`] and consumed by [`ExportedChunk::import`];
/// the FFI structures are released exactly once, on import or drop.
pub struct ExportedChunk {
    payload: Option<(FFI_ArrowArray, FFI_ArrowSchema)>,
    schema: SchemaRef,
    num_rows: usize,
}

impl ExportedChunk {
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Import the exported structures as a record batch
    ///
    /// The batch's schema is the one that travelled through the interface,
    /// so it is exactly the schema the consumer would see.
    pub fn import(self) -> Result<RecordBatch> {
        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));

        let Some((array, ffi_schema)) = self.payload else {
            // No columns, nothing to hand over
            return RecordBatch::try_new_with_options(self.schema, vec![], &options)
                .context("Failed to build zero-column batch");
        };

        let imported_schema = Schema::try_from(&ffi_schema).context("Failed to import schema")?;

        // SAFETY: `array` and `ffi_schema` were produced together by
        // `export_chunk` from one struct array and are consumed only here.
        let data = unsafe { from_ffi(array, &ffi_schema) }.context("Failed to import chunk")?;
        let columns = StructArray::from(data).columns().to_vec();

        RecordBatch::try_new_with_options(Arc::new(imported_schema), columns, &options)
            .context("Imported chunk does not match its schema")
    }
}

/// Export a chunk under `schema`, consuming it
///
/// # Arguments
/// * `chunk` - Engine chunk; ownership of its buffers moves into the export
/// * `schema` - Target schema, one field per chunk column in the same order
///
/// # Errors
/// Returns error if the column count disagrees with the schema or a column
/// cannot be packed into the interchange structures
pub fn export_chunk(chunk: DataChunk, schema: &SchemaRef) -> Result<ExportedChunk> {
    if chunk.column_count() != schema.fields().len() {
        return Err(anyhow!(
            "Chunk has {} columns but schema describes {}",
            chunk.column_count(),
            schema.fields().len()
        ));
    }

    let num_rows = chunk.cardinality();
    let columns = chunk
        .into_columns()
        .into_iter()
        .zip(schema.fields().iter())
        .map(|(column, field)| {
            conform_column(column, field.data_type())
                .with_context(|| format!("Failed to export column '{}'", field.name()))
        })
        .collect::<Result<Vec<_>>>()?;

    if columns.is_empty() {
        return Ok(ExportedChunk {
            payload: None,
            schema: Arc::clone(schema),
            num_rows,
        });
    }

    let ffi_schema = FFI_ArrowSchema::try_from(schema.as_ref()).context("Failed to export schema")?;
    let packed = StructArray::try_new(schema.fields().clone(), columns, None)
        .context("Failed to pack chunk columns")?;
    let ffi_array = FFI_ArrowArray::new(&packed.to_data());

    Ok(ExportedChunk {
        payload: Some((ffi_array, ffi_schema)),
        schema: Arc::clone(schema),
        num_rows,
    })
}

/// Bring one engine vector into the layout of `target`
///
/// Identical layouts are returned as-is. Conversions the format cannot
/// express degrade to an all-null column rather than failing.
pub fn conform_column(column: ArrayRef, target: &DataType) -> Result<ArrayRef> {
    if column.data_type() == target {
        return Ok(column);
    }

    match target {
        DataType::Null => {
            tracing::debug!("Dropping {} values into untyped null column", column.data_type());
            Ok(new_null_array(target, column.len()))
        }
        DataType::Decimal128(precision, scale) => conform_decimal(&column, *precision, *scale),
        DataType::Timestamp(unit, _) => conform_timestamp(&column, *unit, target),
        DataType::Duration(TimeUnit::Microsecond) => conform_duration(&column),
        _ => cast_or_null(&column, target),
    }
}

fn cast_or_null(column: &ArrayRef, target: &DataType) -> Result<ArrayRef> {
    if !can_cast_types(column.data_type(), target) {
        tracing::warn!(
            "No conversion from {} to {}, exporting nulls",
            column.data_type(),
            target
        );
        return Ok(new_null_array(target, column.len()));
    }

    cast(column, target)
        .with_context(|| format!("Failed to convert {} to {}", column.data_type(), target))
}

/// Decimal values keep their 128-bit storage and are re-tagged with the
/// target (precision, scale) without rescaling.
fn conform_decimal(column: &ArrayRef, precision: u8, scale: i8) -> Result<ArrayRef> {
    let target = DataType::Decimal128(precision, scale);

    let storage = match column.data_type() {
        DataType::Decimal128(_, _) => Arc::clone(column),
        DataType::Decimal256(p, s) => cast_or_null(column, &DataType::Decimal128((*p).min(38), *s))?,
        DataType::Null => return Ok(new_null_array(&target, column.len())),
        source if can_cast_types(source, &DataType::Int64) => {
            let ticks = cast(column, &DataType::Int64)
                .with_context(|| format!("Failed to read {} as integers", source))?;
            cast(&ticks, &DataType::Decimal128(38, 0)).context("Failed to widen integers")?
        }
        source => {
            tracing::warn!("No integer representation for {}, exporting nulls", source);
            return Ok(new_null_array(&target, column.len()));
        }
    };

    let values = storage
        .as_primitive::<Decimal128Type>()
        .clone()
        .with_data_type(target);
    Ok(Arc::new(values))
}

fn nanos_per_tick(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Second => 1_000_000_000,
        TimeUnit::Millisecond => 1_000_000,
        TimeUnit::Microsecond => 1_000,
        TimeUnit::Nanosecond => 1,
    }
}

/// (multiplier, divisor) turning `from` ticks into `to` ticks
fn rescale_factors(from: TimeUnit, to: TimeUnit) -> (i64, i64) {
    let (from, to) = (nanos_per_tick(from), nanos_per_tick(to));
    if from >= to {
        (from / to, 1)
    } else {
        (1, to / from)
    }
}

fn conform_timestamp(column: &ArrayRef, unit: TimeUnit, target: &DataType) -> Result<ArrayRef> {
    let source_unit = match column.data_type() {
        DataType::Time32(u) | DataType::Time64(u) | DataType::Timestamp(u, _) => *u,
        _ => return cast_or_null(column, target),
    };

    let ticks = match column.data_type() {
        DataType::Time32(_) => cast(&cast(column, &DataType::Int32)?, &DataType::Int64)?,
        _ => cast(column, &DataType::Int64)?,
    };
    let ticks = ticks.as_primitive::<Int64Type>();

    let (multiplier, divisor) = rescale_factors(source_unit, unit);
    let rescale = |v: i64| v.saturating_mul(multiplier) / divisor;

    let rescaled: ArrayRef = match unit {
        TimeUnit::Second => Arc::new(ticks.unary::<_, TimestampSecondType>(rescale)),
        TimeUnit::Millisecond => Arc::new(ticks.unary::<_, TimestampMillisecondType>(rescale)),
        TimeUnit::Microsecond => Arc::new(ticks.unary::<_, TimestampMicrosecondType>(rescale)),
        TimeUnit::Nanosecond => Arc::new(ticks.unary::<_, TimestampNanosecondType>(rescale)),
    };

    Ok(rescaled)
}

fn conform_duration(column: &ArrayRef) -> Result<ArrayRef> {
    let micros: ArrayRef = match column.data_type() {
        DataType::Interval(IntervalUnit::MonthDayNano) => Arc::new(
            column
                .as_primitive::<IntervalMonthDayNanoType>()
                .unary::<_, DurationMicrosecondType>(|v| {
                    (v.months as i64)
                        .saturating_mul(MICROS_PER_MONTH)
                        .saturating_add((v.days as i64).saturating_mul(MICROS_PER_DAY))
                        .saturating_add(v.nanoseconds / 1_000)
                }),
        ),
        DataType::Interval(IntervalUnit::DayTime) => Arc::new(
            column
                .as_primitive::<IntervalDayTimeType>()
                .unary::<_, DurationMicrosecondType>(|v| {
                    (v.days as i64)
                        .saturating_mul(MICROS_PER_DAY)
                        .saturating_add((v.milliseconds as i64).saturating_mul(1_000))
                }),
        ),
        DataType::Interval(IntervalUnit::YearMonth) => Arc::new(
            column
                .as_primitive::<IntervalYearMonthType>()
                .unary::<_, DurationMicrosecondType>(|months| {
                    (months as i64).saturating_mul(MICROS_PER_MONTH)
                }),
        ),
        _ => return cast_or_null(column, &DataType::Duration(TimeUnit::Microsecond)),
    };

    Ok(micros)
}
