use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Server error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message shown to the user: the server's own `message` when it sent one,
    /// otherwise `fallback`. Transport and decode errors never surface their
    /// raw text here; they are logged by the client.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            Self::Server {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins_over_fallback() {
        let err = ApiError::Server {
            status: 400,
            message: Some("Column not found".to_string()),
        };
        assert_eq!(err.message_or("Server Error: Please try again"), "Column not found");
    }

    #[test]
    fn test_fallback_when_no_message() {
        let err = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.message_or("Failed to save dashboard"), "Failed to save dashboard");

        let blank = ApiError::Server {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.message_or("fallback"), "fallback");
    }

    #[test]
    fn test_transport_errors_use_fallback() {
        let err = ApiError::Network(
            "error sending request for url (http://x/api/queries/run)".to_string(),
        );
        assert_eq!(
            err.message_or("Server Error: Please try again"),
            "Server Error: Please try again"
        );
        let decode = ApiError::Decode("expected value at line 1".to_string());
        assert_eq!(decode.message_or("Failed to fetch dashboards"), "Failed to fetch dashboards");
    }
}
