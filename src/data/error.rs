use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Session expired: {0}")]
    SessionExpired(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl DataError {
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(msg) => Self::SessionExpired(msg),
            other => Self::Request(other.message_or(fallback)),
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
