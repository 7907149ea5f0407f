//! Domain errors for the decoration client.

use thiserror::Error;

use crate::domain::models::UserId;

/// Domain-level errors that can occur in the decoration client.
#[derive(Debug, Error)]
pub enum DecorError {
    #[error("Decoration lookup failed: {0}")]
    LookupFailed(String),

    #[error("Decoration lookup timed out after {0}s")]
    LookupTimedOut(u64),

    #[error("Decoration service error: {0}")]
    Api(String),

    #[error("Not authenticated: a decoration service token is required")]
    NotAuthenticated,

    #[error("Decoration not found: {0}")]
    DecorationNotFound(String),

    #[error("Invalid decoration: {0}")]
    InvalidDecoration(String),

    #[error("A decoration is pending review")]
    PendingReview,

    #[error("Live user update failed for {user_id}: {reason}")]
    NotificationFailed { user_id: UserId, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DecorResult<T> = Result<T, DecorError>;

impl From<serde_json::Error> for DecorError {
    fn from(err: serde_json::Error) -> Self {
        DecorError::SerializationError(err.to_string())
    }
}
