pub mod api;
pub mod auth;
pub mod charts;
pub mod config;
pub mod dashboards;
pub mod data;
pub mod query;
pub mod session;
pub mod shared;

pub use api::{ApiClient, ApiError};
pub use config::ClientConfig;
pub use session::{Role, Session, User};
