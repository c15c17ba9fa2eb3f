use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Session expired: {0}")]
    SessionExpired(String),
}

impl AuthError {
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(msg) => Self::SessionExpired(msg),
            other => Self::Request(other.message_or(fallback)),
        }
    }
}
