pub mod sequence;
pub mod values;

pub use sequence::{RequestSequence, RequestTag};
pub use values::Row;
