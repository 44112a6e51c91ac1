//! Conversion logic between DTOs and domain entities.

use crate::domain::{IdentityToken, Message, RoomEvent};
use crate::infrastructure::dto::{
    http::MessageDto,
    realtime::{DestroyPayload, RealtimeEvent},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl MessageDto {
    /// Render a message for `viewer`, disclosing the owner token only to its owner
    pub fn for_viewer(message: Message, viewer: Option<&IdentityToken>) -> Self {
        let owner_token = viewer
            .filter(|token| message.is_owned_by(token))
            .map(|token| token.as_str().to_string());

        Self {
            id: message.id.into_string(),
            room_id: message.room_id.into_string(),
            sender: message.sender.into_string(),
            text: message.text.into_string(),
            timestamp: message.timestamp.value(),
            owner_token,
        }
    }
}

impl From<RoomEvent> for RealtimeEvent {
    fn from(event: RoomEvent) -> Self {
        match event {
            // Pushed payloads never carry the owner token.
            RoomEvent::MessageCreated(message) => {
                Self::Message(MessageDto::for_viewer(message, None))
            }
            RoomEvent::Destroyed => Self::Destroy(DestroyPayload { is_destroyed: true }),
        }
    }
}
