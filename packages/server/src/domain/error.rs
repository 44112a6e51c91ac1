//! Domain errors.

use thiserror::Error;

/// Value object construction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} contains invalid characters")]
    InvalidCharacters { field: &'static str },
}

/// Failures reported by a [`crate::domain::RoomStore`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The room's meta key is absent or expired
    #[error("room not found")]
    RoomNotFound,

    /// The backing store could not be reached; callers may retry
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures reported by a [`crate::domain::MessageRelay`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("failed to publish event: {0}")]
    PublishFailed(String),
}
