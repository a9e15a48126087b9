pub mod batch_reader;
pub mod datafusion; // DataFusion engine behind the engine traits
pub mod engine; // Engine seam: connection, prepared handle, cursor
pub mod export; // C Data Interface chunk handoff
pub mod materializer;
pub mod parameters;
pub mod schema_builder;
pub mod statement;
pub mod type_mapper;

pub use batch_reader::*;
pub use materializer::*;
pub use schema_builder::*;
pub use statement::*;
pub use type_mapper::*;
