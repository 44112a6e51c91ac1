//! UseCase: メッセージ履歴取得

use std::sync::Arc;

use crate::domain::{Message, RoomId, RoomStore};

use super::error::ReadRoomError;

/// メッセージ履歴取得のユースケース
pub struct GetMessagesUseCase {
    store: Arc<dyn RoomStore>,
}

impl GetMessagesUseCase {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// 全履歴を追加順で返す（ページングなし）
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<Message>, ReadRoomError> {
        if self.store.get_meta(room_id).await?.is_none() {
            return Err(ReadRoomError::RoomNotFound);
        }
        Ok(self.store.list_messages(room_id).await?)
    }
}
