use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Session expired: {0}")]
    SessionExpired(String),
}

impl QueryError {
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(msg) => Self::SessionExpired(msg),
            other => Self::Request(other.message_or(fallback)),
        }
    }

    /// Text suitable for a transient warning or error banner.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::Forbidden(msg)
            | Self::Request(msg)
            | Self::SessionExpired(msg) => msg,
        }
    }
}
