pub mod builder;
pub mod error;
pub mod payload;
pub mod types;

pub use builder::ChartBuilder;
pub use error::ChartError;
pub use payload::{build_payload, ChartContext};
pub use types::*;
