//! UseCase: Room チャンネルの購読

use std::sync::Arc;

use crate::domain::{MessageRelay, RoomId, RoomSubscription};

pub struct SubscribeRoomUseCase {
    relay: Arc<dyn MessageRelay>,
}

impl SubscribeRoomUseCase {
    pub fn new(relay: Arc<dyn MessageRelay>) -> Self {
        Self { relay }
    }

    pub async fn execute(&self, room_id: &RoomId) -> RoomSubscription {
        self.relay.subscribe(room_id).await
    }
}
