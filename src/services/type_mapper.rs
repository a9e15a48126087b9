// TypeMapper
//
// Total mapping from engine logical types to columnar types. Kinds the
// columnar format cannot represent losslessly degrade to one of two fallback
// buckets instead of failing the statement.

use datafusion::arrow::datatypes::TimeUnit;

use crate::models::{ColumnarType, LogicalType};

/// Maps engine logical types onto columnar types
pub struct TypeMapper;

impl TypeMapper {
    /// Map one logical type to its columnar type
    ///
    /// Never fails. Decimal arguments are emitted as (scale, width): the
    /// engine's scale becomes the columnar precision and its width becomes
    /// the columnar scale. Wire clients depend on that order.
    pub fn map(logical_type: &LogicalType) -> ColumnarType {
        match *logical_type {
            LogicalType::TinyInt => ColumnarType::Int8,
            LogicalType::SmallInt => ColumnarType::Int16,
            LogicalType::Integer => ColumnarType::Int32,
            LogicalType::BigInt => ColumnarType::Int64,

            LogicalType::UTinyInt => ColumnarType::UInt8,
            LogicalType::USmallInt => ColumnarType::UInt16,
            LogicalType::UInteger => ColumnarType::UInt32,
            // Narrowing: values above i64::MAX do not survive
            LogicalType::UBigInt => ColumnarType::Int64,

            LogicalType::Float => ColumnarType::Float32,
            LogicalType::Double => ColumnarType::Float64,
            LogicalType::Boolean => ColumnarType::Boolean,

            LogicalType::Char | LogicalType::Varchar => ColumnarType::Utf8,
            LogicalType::Blob => ColumnarType::Binary,

            LogicalType::Decimal { width, scale } => ColumnarType::Decimal128 {
                precision: scale,
                scale: width as i8,
            },

            LogicalType::Date => ColumnarType::Date32,
            LogicalType::Time | LogicalType::TimestampMs => {
                ColumnarType::Timestamp(TimeUnit::Millisecond)
            }
            LogicalType::Timestamp => ColumnarType::Timestamp(TimeUnit::Microsecond),
            LogicalType::TimestampSec => ColumnarType::Timestamp(TimeUnit::Second),
            LogicalType::TimestampNs => ColumnarType::Timestamp(TimeUnit::Nanosecond),

            // The engine does not document an interval unit; microseconds assumed
            LogicalType::Interval => ColumnarType::Duration(TimeUnit::Microsecond),

            LogicalType::Invalid
            | LogicalType::SqlNull
            | LogicalType::Unknown
            | LogicalType::Any
            | LogicalType::User
            | LogicalType::TimestampTz
            | LogicalType::TimeTz
            | LogicalType::HugeInt => ColumnarType::DECIMAL_FALLBACK,

            LogicalType::Pointer
            | LogicalType::Validity
            | LogicalType::Uuid
            | LogicalType::Struct
            | LogicalType::List
            | LogicalType::Map
            | LogicalType::Table
            | LogicalType::Enum
            | LogicalType::UHugeInt
            | LogicalType::Bit
            | LogicalType::Array
            | LogicalType::Union => ColumnarType::Null,
        }
    }

    /// True when `map` discards information for this logical type
    pub fn is_lossy(logical_type: &LogicalType) -> bool {
        match Self::map(logical_type) {
            ColumnarType::Null => true,
            ColumnarType::Int64 => matches!(logical_type, LogicalType::UBigInt),
            ColumnarType::DECIMAL_FALLBACK => !matches!(logical_type, LogicalType::Decimal { .. }),
            _ => false,
        }
    }
}
