use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Session expired: {0}")]
    SessionExpired(String),
}

impl DashboardError {
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(msg) => Self::SessionExpired(msg),
            other => Self::Request(other.message_or(fallback)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("Max {max} charts allowed")]
    CapacityReached { max: usize },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Session expired: {0}")]
    SessionExpired(String),
}

impl GroupError {
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(msg) => Self::SessionExpired(msg),
            other => Self::Request(other.message_or(fallback)),
        }
    }
}
