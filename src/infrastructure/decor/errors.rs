use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::DecorError;

/// Errors that can occur when talking to the decoration service
#[derive(Error, Debug)]
pub enum DecorApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or rejected token (HTTP 401)
    #[error("Unauthorized - token missing or rejected")]
    Unauthorized,

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unknown or unexpected error
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl DecorApiError {
    /// Classify a non-success response
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            status if status.is_server_error() => Self::ServerError(status, body),
            _ => Self::UnknownError(status, body),
        }
    }

    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded | Self::ServerError(_, _) => true,
            Self::NetworkError(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            _ => false,
        }
    }

    /// Returns true if this is a permanent error that should not be retried
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::Unauthorized | Self::Forbidden(_) | Self::NotFound
        )
    }
}

impl From<DecorApiError> for DecorError {
    fn from(err: DecorApiError) -> Self {
        match err {
            DecorApiError::Unauthorized => Self::NotAuthenticated,
            DecorApiError::JsonError(err) => Self::SerializationError(err.to_string()),
            other => Self::Api(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            DecorApiError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            DecorApiError::Unauthorized
        ));
        assert!(matches!(
            DecorApiError::from_status(StatusCode::BAD_GATEWAY, "down".to_string()),
            DecorApiError::ServerError(StatusCode::BAD_GATEWAY, _)
        ));
        assert!(matches!(
            DecorApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            DecorApiError::UnknownError(..)
        ));
    }

    #[test]
    fn test_transient_errors() {
        assert!(DecorApiError::RateLimitExceeded.is_transient());
        assert!(
            DecorApiError::ServerError(StatusCode::SERVICE_UNAVAILABLE, "busy".to_string())
                .is_transient()
        );
        assert!(!DecorApiError::NotFound.is_transient());
    }

    #[test]
    fn test_permanent_errors() {
        assert!(DecorApiError::InvalidRequest("bad".to_string()).is_permanent());
        assert!(DecorApiError::Unauthorized.is_permanent());
        assert!(DecorApiError::Forbidden("no".to_string()).is_permanent());
        assert!(!DecorApiError::RateLimitExceeded.is_permanent());
    }

    #[test]
    fn test_unauthorized_maps_to_not_authenticated() {
        let err: DecorError = DecorApiError::Unauthorized.into();
        assert!(matches!(err, DecorError::NotAuthenticated));
    }
}
