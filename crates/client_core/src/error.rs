use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from server.";

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Network(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("unexpected response from server (status {status})")]
    UnexpectedResponse { status: u16 },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl ClientError {
    /// Text shown next to the form that triggered the failed call.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => err.message.clone(),
            Self::UnexpectedResponse { .. } => UNEXPECTED_RESPONSE_MESSAGE.to_string(),
            Self::Network(_) | Self::Decode(_) | Self::InvalidRequest(_) => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status),
            Self::UnexpectedResponse { status } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.status().map(ErrorCode::from_status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code() == Some(ErrorCode::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_surface_backend_message() {
        let err = ClientError::from(ApiError::new(400, "title required"));
        assert_eq!(err.user_message("Could not create project."), "title required");
        assert_eq!(err.code(), Some(ErrorCode::Validation));
    }

    #[test]
    fn unparseable_error_bodies_use_unexpected_response_text() {
        let err = ClientError::UnexpectedResponse { status: 502 };
        assert_eq!(err.user_message("ignored"), UNEXPECTED_RESPONSE_MESSAGE);
        assert_eq!(err.code(), Some(ErrorCode::Internal));
    }

    #[test]
    fn transport_and_decode_failures_use_fallback() {
        let network = ClientError::Network("connection refused".to_string());
        let decode = ClientError::Decode("expected value".to_string());
        assert_eq!(network.user_message("Login failed."), "Login failed.");
        assert_eq!(decode.user_message("Login failed."), "Login failed.");
        assert!(!network.is_unauthorized());
    }

    #[test]
    fn unauthorized_is_detected_from_status() {
        let err = ClientError::UnexpectedResponse { status: 401 };
        assert!(err.is_unauthorized());
    }
}
