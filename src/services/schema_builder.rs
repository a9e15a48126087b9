// SchemaBuilder
//
// Derives columnar schemas from engine column descriptions. The session
// timezone is passed in explicitly so derivation stays a pure function of
// its inputs.

use datafusion::arrow::datatypes::{Field, Schema, SchemaRef};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{ColumnDescriptor, LogicalType};
use crate::services::type_mapper::TypeMapper;

/// Field metadata key carrying the session timezone on timestamp columns
pub const TIMEZONE_METADATA_KEY: &str = "timezone";

/// Builds Arrow schemas for statement results and parameters
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Build the result schema for an ordered list of output columns
    ///
    /// # Arguments
    /// * `columns` - Output columns in result order
    /// * `timezone` - Session timezone, attached to timestamp columns
    ///
    /// # Returns
    /// Schema whose field order matches `columns`
    pub fn build(columns: &[ColumnDescriptor], timezone: Option<&str>) -> SchemaRef {
        let fields: Vec<Field> = columns
            .iter()
            .map(|column| Self::field(&column.name, &column.logical_type, timezone))
            .collect();

        Arc::new(Schema::new(fields))
    }

    /// Build a single nullable field
    pub fn field(name: &str, logical_type: &LogicalType, timezone: Option<&str>) -> Field {
        if TypeMapper::is_lossy(logical_type) {
            tracing::debug!(
                "Column '{}' of type {} degrades to {:?}",
                name,
                logical_type,
                TypeMapper::map(logical_type)
            );
        }

        let field = Field::new(name, TypeMapper::map(logical_type).to_arrow(), true);

        match timezone {
            Some(tz) if logical_type.is_timestamp() || logical_type.is_zone_aware() => {
                let mut metadata = HashMap::new();
                metadata.insert(TIMEZONE_METADATA_KEY.to_string(), tz.to_string());
                field.with_metadata(metadata)
            }
            _ => field,
        }
    }

    /// Build the schema describing a prepared statement's parameters
    ///
    /// Fields are named `parameter_1`, `parameter_2`, ... in placeholder order.
    pub fn parameter_schema(parameter_types: &[LogicalType]) -> SchemaRef {
        let fields: Vec<Field> = parameter_types
            .iter()
            .enumerate()
            .map(|(idx, logical_type)| {
                Field::new(
                    format!("parameter_{}", idx + 1),
                    TypeMapper::map(logical_type).to_arrow(),
                    true,
                )
            })
            .collect();

        Arc::new(Schema::new(fields))
    }

    /// True when both schemas have the same column count, names and base
    /// types. Field metadata (timezone) is ignored.
    pub fn same_shape(left: &Schema, right: &Schema) -> bool {
        left.fields().len() == right.fields().len()
            && left
                .fields()
                .iter()
                .zip(right.fields().iter())
                .all(|(l, r)| l.name() == r.name() && l.data_type() == r.data_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::arrow::datatypes::{DataType, TimeUnit};

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", LogicalType::Integer),
            ColumnDescriptor::new("name", LogicalType::Varchar),
            ColumnDescriptor::new("created_at", LogicalType::Timestamp),
        ]
    }

    #[test]
    fn test_build_preserves_order_and_types() {
        let schema = SchemaBuilder::build(&columns(), None);

        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(0).name(), "id");
        assert_eq!(schema.field(0).data_type(), &DataType::Int32);
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(
            schema.field(2).data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, None)
        );
        assert!(schema.field(2).metadata().is_empty());
    }

    #[test]
    fn test_timezone_only_on_timestamp_columns() {
        let schema = SchemaBuilder::build(&columns(), Some("Europe/Amsterdam"));

        assert!(schema.field(0).metadata().is_empty());
        assert!(schema.field(1).metadata().is_empty());
        assert_eq!(
            schema.field(2).metadata().get(TIMEZONE_METADATA_KEY),
            Some(&"Europe/Amsterdam".to_string())
        );
    }

    #[test]
    fn test_same_shape_ignores_timezone() {
        let utc = SchemaBuilder::build(&columns(), Some("UTC"));
        let local = SchemaBuilder::build(&columns(), Some("America/New_York"));
        assert!(SchemaBuilder::same_shape(&utc, &local));

        let fewer = SchemaBuilder::build(&columns()[..2], Some("UTC"));
        assert!(!SchemaBuilder::same_shape(&utc, &fewer));
    }

    #[test]
    fn test_parameter_schema() {
        let schema = SchemaBuilder::parameter_schema(&[LogicalType::BigInt, LogicalType::Unknown]);

        assert_eq!(schema.field(0).name(), "parameter_1");
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).name(), "parameter_2");
        assert_eq!(schema.field(1).data_type(), &DataType::Decimal128(38, 0));
    }

    #[test]
    fn test_empty_schema() {
        let schema = SchemaBuilder::build(&[], Some("UTC"));
        assert_eq!(schema.fields().len(), 0);
    }
}
