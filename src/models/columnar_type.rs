// Columnar types
//
// The subset of the Arrow type system the bridge produces. Every engine
// logical type lands on exactly one of these.

use datafusion::arrow::datatypes::{DataType, TimeUnit};

/// Column type tag in the columnar interchange format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnarType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Boolean,
    Utf8,
    Binary,
    /// 128-bit decimal, in Arrow's (precision, scale) order
    Decimal128 { precision: u8, scale: i8 },
    /// Days since the Unix epoch
    Date32,
    Timestamp(TimeUnit),
    Duration(TimeUnit),
    /// Untyped placeholder for kinds the format cannot carry
    Null,
}

impl ColumnarType {
    /// Catch-all for engine kinds without a faithful columnar counterpart
    pub const DECIMAL_FALLBACK: ColumnarType = ColumnarType::Decimal128 {
        precision: 38,
        scale: 0,
    };

    /// Arrow data type for this tag. Timestamps never carry a timezone here;
    /// the session timezone travels as field metadata instead.
    pub fn to_arrow(&self) -> DataType {
        match self {
            ColumnarType::Int8 => DataType::Int8,
            ColumnarType::Int16 => DataType::Int16,
            ColumnarType::Int32 => DataType::Int32,
            ColumnarType::Int64 => DataType::Int64,
            ColumnarType::UInt8 => DataType::UInt8,
            ColumnarType::UInt16 => DataType::UInt16,
            ColumnarType::UInt32 => DataType::UInt32,
            ColumnarType::UInt64 => DataType::UInt64,
            ColumnarType::Float32 => DataType::Float32,
            ColumnarType::Float64 => DataType::Float64,
            ColumnarType::Boolean => DataType::Boolean,
            ColumnarType::Utf8 => DataType::Utf8,
            ColumnarType::Binary => DataType::Binary,
            ColumnarType::Decimal128 { precision, scale } => DataType::Decimal128(*precision, *scale),
            ColumnarType::Date32 => DataType::Date32,
            ColumnarType::Timestamp(unit) => DataType::Timestamp(*unit, None),
            ColumnarType::Duration(unit) => DataType::Duration(*unit),
            ColumnarType::Null => DataType::Null,
        }
    }
}

impl From<ColumnarType> for DataType {
    fn from(value: ColumnarType) -> Self {
        value.to_arrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_arrow() {
        assert_eq!(ColumnarType::Int32.to_arrow(), DataType::Int32);
        assert_eq!(ColumnarType::Utf8.to_arrow(), DataType::Utf8);
        assert_eq!(
            ColumnarType::Timestamp(TimeUnit::Millisecond).to_arrow(),
            DataType::Timestamp(TimeUnit::Millisecond, None)
        );
        assert_eq!(
            ColumnarType::DECIMAL_FALLBACK.to_arrow(),
            DataType::Decimal128(38, 0)
        );
        assert_eq!(DataType::from(ColumnarType::Null), DataType::Null);
    }
}
