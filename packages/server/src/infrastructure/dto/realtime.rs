//! Realtime channel DTOs.
//!
//! Frames are JSON objects tagged by `event`:
//!
//! ```json
//! {"event":"chat.message","payload":{"id":"...","roomId":"...","sender":"...","text":"...","timestamp":0}}
//! {"event":"chat.destroy","payload":{"isDestroyed":true}}
//! ```

use serde::{Deserialize, Serialize};

use super::http::MessageDto;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum RealtimeEvent {
    #[serde(rename = "chat.message")]
    Message(MessageDto),
    #[serde(rename = "chat.destroy")]
    Destroy(DestroyPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyPayload {
    pub is_destroyed: bool,
}
