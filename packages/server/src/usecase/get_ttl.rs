//! UseCase: 残り TTL 取得

use std::sync::Arc;

use crate::domain::{RoomId, RoomStore};

use super::error::ReadRoomError;

pub struct GetTtlUseCase {
    store: Arc<dyn RoomStore>,
}

impl GetTtlUseCase {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Remaining seconds; 0 for expired or absent rooms, never negative
    pub async fn execute(&self, room_id: &RoomId) -> Result<u64, ReadRoomError> {
        Ok(self.store.remaining_ttl(room_id).await?)
    }
}
