//! UseCase: メッセージ送信
//!
//! 保存と配信は並行して行い、両方が完了した時点で呼び出し元に返す。
//! TTL の延長はその後、切り離されたタスクで行われる。

use std::sync::Arc;

use embers_shared::time::Clock;

use crate::domain::{
    IdentityToken, Message, MessageId, MessageRelay, MessageText, RoomEvent, RoomId, RoomStore,
    SenderName, Timestamp,
};

use super::{error::SendMessageError, lifecycle::RoomLifecycle};

/// A validated, not yet stored message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    sender: SenderName,
    text: MessageText,
}

impl MessageDraft {
    /// Validate raw input; nothing is written if this fails
    pub fn parse(sender: String, text: String) -> Result<Self, SendMessageError> {
        Ok(Self {
            sender: SenderName::new(sender)?,
            text: MessageText::new(text)?,
        })
    }
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    store: Arc<dyn RoomStore>,
    relay: Arc<dyn MessageRelay>,
    lifecycle: Arc<RoomLifecycle>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        store: Arc<dyn RoomStore>,
        relay: Arc<dyn MessageRelay>,
        lifecycle: Arc<RoomLifecycle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            relay,
            lifecycle,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(MessageId)` - サーバーが採番したメッセージ ID
    /// * `Err(SendMessageError)` - Room が存在しない、またはストア障害
    pub async fn execute(
        &self,
        room_id: &RoomId,
        owner: IdentityToken,
        draft: MessageDraft,
    ) -> Result<MessageId, SendMessageError> {
        if self.store.get_meta(room_id).await?.is_none() {
            return Err(SendMessageError::RoomNotFound);
        }

        let message = Message::new(
            room_id.clone(),
            draft.sender,
            draft.text,
            Timestamp::new(self.clock.now_millis()),
            owner,
        );
        let message_id = message.id.clone();
        let event = RoomEvent::MessageCreated(message.clone());

        let (stored, published) = tokio::join!(
            self.store.append_message(message),
            self.relay.publish(room_id, event),
        );
        stored?;
        if let Err(e) = published {
            // Viewers recover through a refetch; the send itself succeeded.
            tracing::warn!("Failed to publish message to room '{}': {}", room_id, e);
        }

        let _renewal = self.lifecycle.spawn_renewal(room_id.clone());

        tracing::debug!("Message '{}' stored in room '{}'", message_id, room_id);
        Ok(message_id)
    }
}
