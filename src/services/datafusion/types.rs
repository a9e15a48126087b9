// Arrow type to engine logical type
//
// DataFusion reports plan schemas in Arrow types; the bridge reasons in
// engine logical types, so plan columns are described through this table.

use datafusion::arrow::datatypes::{DataType, TimeUnit};

use crate::models::LogicalType;

/// Describe a DataFusion column type as an engine logical type
pub fn logical_type_of(data_type: &DataType) -> LogicalType {
    match data_type {
        DataType::Null => LogicalType::SqlNull,
        DataType::Boolean => LogicalType::Boolean,
        DataType::Int8 => LogicalType::TinyInt,
        DataType::Int16 => LogicalType::SmallInt,
        DataType::Int32 => LogicalType::Integer,
        DataType::Int64 => LogicalType::BigInt,
        DataType::UInt8 => LogicalType::UTinyInt,
        DataType::UInt16 => LogicalType::USmallInt,
        DataType::UInt32 => LogicalType::UInteger,
        DataType::UInt64 => LogicalType::UBigInt,
        DataType::Float16 | DataType::Float32 => LogicalType::Float,
        DataType::Float64 => LogicalType::Double,
        DataType::Decimal128(precision, scale) | DataType::Decimal256(precision, scale) => {
            LogicalType::Decimal {
                width: *precision,
                scale: (*scale).max(0) as u8,
            }
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => LogicalType::Varchar,
        DataType::Binary
        | DataType::LargeBinary
        | DataType::BinaryView
        | DataType::FixedSizeBinary(_) => LogicalType::Blob,
        DataType::Date32 | DataType::Date64 => LogicalType::Date,
        DataType::Time32(_) | DataType::Time64(_) => LogicalType::Time,
        DataType::Timestamp(_, Some(_)) => LogicalType::TimestampTz,
        DataType::Timestamp(TimeUnit::Second, None) => LogicalType::TimestampSec,
        DataType::Timestamp(TimeUnit::Millisecond, None) => LogicalType::TimestampMs,
        DataType::Timestamp(TimeUnit::Microsecond, None) => LogicalType::Timestamp,
        DataType::Timestamp(TimeUnit::Nanosecond, None) => LogicalType::TimestampNs,
        DataType::Interval(_) | DataType::Duration(_) => LogicalType::Interval,
        DataType::List(_) | DataType::LargeList(_) | DataType::ListView(_) => LogicalType::List,
        DataType::FixedSizeList(_, _) => LogicalType::Array,
        DataType::Struct(_) => LogicalType::Struct,
        DataType::Map(_, _) => LogicalType::Map,
        DataType::Union(_, _) => LogicalType::Union,
        DataType::Dictionary(_, value_type) => logical_type_of(value_type),
        _ => LogicalType::Unknown,
    }
}
