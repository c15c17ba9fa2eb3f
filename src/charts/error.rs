use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not applicable: {0}")]
    FieldNotApplicable(String),
    #[error("Group is full: max {0} charts allowed")]
    GroupFull(usize),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Session expired: {0}")]
    SessionExpired(String),
}

impl ChartError {
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(msg) => Self::SessionExpired(msg),
            other => Self::Request(other.message_or(fallback)),
        }
    }
}
