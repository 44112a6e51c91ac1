//! UseCase errors.

use thiserror::Error;

use crate::domain::{StoreError, ValueObjectError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizeError {
    #[error("room not found")]
    RoomNotFound,

    #[error("room is full")]
    RoomFull,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("invalid message: {0}")]
    Validation(#[from] ValueObjectError),

    #[error("room not found")]
    RoomNotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors for read-only room queries (history, TTL)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadRoomError {
    #[error("room not found")]
    RoomNotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestroyRoomError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for CreateRoomError {
    fn from(error: StoreError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

impl From<StoreError> for AuthorizeError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::RoomNotFound => Self::RoomNotFound,
            StoreError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}

impl From<StoreError> for SendMessageError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::RoomNotFound => Self::RoomNotFound,
            StoreError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}

impl From<StoreError> for ReadRoomError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::RoomNotFound => Self::RoomNotFound,
            StoreError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}
