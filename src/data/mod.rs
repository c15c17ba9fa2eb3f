pub mod error;
pub mod registry;
pub mod service;
pub mod types;

pub use error::DataError;
pub use registry::DataSourceRegistry;
pub use types::*;
