// Engine logical types
//
// The query engine's own description of a column's value domain. Engine
// adapters describe every native column type as one of these tags; the
// TypeMapper turns them into columnar types.

use std::fmt;

/// One column's type as understood by the SQL engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Invalid,
    SqlNull,
    Unknown,
    Any,
    User,

    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    HugeInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    UHugeInt,
    Float,
    Double,
    /// Exact decimal, in the engine's (width, scale) order
    Decimal { width: u8, scale: u8 },

    Char,
    Varchar,
    Blob,
    Bit,

    Date,
    Time,
    TimeTz,
    TimestampSec,
    TimestampMs,
    /// Microsecond resolution, the engine's default timestamp
    Timestamp,
    TimestampNs,
    TimestampTz,
    Interval,

    Pointer,
    Validity,
    Uuid,
    Struct,
    List,
    Array,
    Map,
    Union,
    Table,
    Enum,
}

impl LogicalType {
    /// True for every timestamp flavour, zone-aware or not
    pub fn is_timestamp(&self) -> bool {
        matches!(
            self,
            LogicalType::TimestampSec
                | LogicalType::TimestampMs
                | LogicalType::Timestamp
                | LogicalType::TimestampNs
                | LogicalType::TimestampTz
        )
    }

    /// True when values are interpreted relative to the session timezone
    pub fn is_zone_aware(&self) -> bool {
        matches!(self, LogicalType::TimestampTz | LogicalType::TimeTz)
    }

    /// Upper-case SQL-ish name used in logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Invalid => "INVALID",
            LogicalType::SqlNull => "NULL",
            LogicalType::Unknown => "UNKNOWN",
            LogicalType::Any => "ANY",
            LogicalType::User => "USER",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::TinyInt => "TINYINT",
            LogicalType::SmallInt => "SMALLINT",
            LogicalType::Integer => "INTEGER",
            LogicalType::BigInt => "BIGINT",
            LogicalType::HugeInt => "HUGEINT",
            LogicalType::UTinyInt => "UTINYINT",
            LogicalType::USmallInt => "USMALLINT",
            LogicalType::UInteger => "UINTEGER",
            LogicalType::UBigInt => "UBIGINT",
            LogicalType::UHugeInt => "UHUGEINT",
            LogicalType::Float => "FLOAT",
            LogicalType::Double => "DOUBLE",
            LogicalType::Decimal { .. } => "DECIMAL",
            LogicalType::Char => "CHAR",
            LogicalType::Varchar => "VARCHAR",
            LogicalType::Blob => "BLOB",
            LogicalType::Bit => "BIT",
            LogicalType::Date => "DATE",
            LogicalType::Time => "TIME",
            LogicalType::TimeTz => "TIME WITH TIME ZONE",
            LogicalType::TimestampSec => "TIMESTAMP_S",
            LogicalType::TimestampMs => "TIMESTAMP_MS",
            LogicalType::Timestamp => "TIMESTAMP",
            LogicalType::TimestampNs => "TIMESTAMP_NS",
            LogicalType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            LogicalType::Interval => "INTERVAL",
            LogicalType::Pointer => "POINTER",
            LogicalType::Validity => "VALIDITY",
            LogicalType::Uuid => "UUID",
            LogicalType::Struct => "STRUCT",
            LogicalType::List => "LIST",
            LogicalType::Array => "ARRAY",
            LogicalType::Map => "MAP",
            LogicalType::Union => "UNION",
            LogicalType::Table => "TABLE",
            LogicalType::Enum => "ENUM",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Decimal { width, scale } => write!(f, "DECIMAL({}, {})", width, scale),
            other => f.write_str(other.name()),
        }
    }
}
