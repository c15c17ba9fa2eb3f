pub mod builder;
pub mod cache;
pub mod error;
pub mod types;

pub use builder::{PendingQuery, QueryBuilder, QueryState};
pub use cache::QueryResultCache;
pub use error::QueryError;
pub use types::*;
