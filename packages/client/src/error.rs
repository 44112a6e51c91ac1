//! Error types for the chat room client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The room never existed, expired, or was destroyed
    #[error("Room not found (it may have expired or been destroyed)")]
    RoomNotFound,

    /// The room already has its maximum number of participants
    #[error("Room is full")]
    RoomFull,

    /// Any other error response from the server
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Realtime connection error: {0}")]
    Realtime(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Whether the room is gone for good, so retrying is pointless
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::RoomNotFound | ClientError::RoomFull)
    }
}
