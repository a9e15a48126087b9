pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use error::{BridgeError, Result};
pub use models::*;
pub use services::*;
