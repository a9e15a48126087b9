pub mod column;
pub mod columnar_type;
pub mod logical_type;

pub use column::*;
pub use columnar_type::*;
pub use logical_type::*;
