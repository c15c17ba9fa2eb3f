pub mod client;
pub mod error;

use serde::Deserialize;

pub use client::ApiClient;
pub use error::ApiError;

/// Standard `{ "data": ... }` response wrapper used by most endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}
