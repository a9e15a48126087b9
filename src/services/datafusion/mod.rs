// DataFusion engine
//
// Production implementation of the engine seam on Apache Arrow DataFusion 51.0.0.

pub mod connection; // DataFusionConnection, DataFusionPrepared, DataFusionCursor
pub mod session; // DataFusionSessionManager
pub mod types; // Arrow type -> engine logical type

pub use connection::{DataFusionConnection, DataFusionCursor, DataFusionPrepared};
pub use session::DataFusionSessionManager;
pub use types::logical_type_of;
