//! UseCase: Room 破棄

use std::sync::Arc;

use crate::domain::RoomId;

use super::{error::DestroyRoomError, lifecycle::RoomLifecycle};

pub struct DestroyRoomUseCase {
    lifecycle: Arc<RoomLifecycle>,
}

impl DestroyRoomUseCase {
    pub fn new(lifecycle: Arc<RoomLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// 接続中の閲覧者に通知してから、Room のキーをすべて削除する
    pub async fn execute(&self, room_id: &RoomId) -> Result<(), DestroyRoomError> {
        self.lifecycle.on_destroy_request(room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageRelay, RoomEvent, RoomStore, Timestamp},
        infrastructure::{
            message_relay::BroadcastMessageRelay, repository::InMemoryRoomStore,
        },
    };
    use std::time::Duration;

    #[tokio::test]
    async fn test_destroy_room_notifies_and_deletes() {
        // テスト項目: 破棄で閲覧者に destroy が届き、両キーが削除される
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new());
        let relay = Arc::new(BroadcastMessageRelay::default());
        let room_id = store
            .create_room(Timestamp::new(0), Duration::from_secs(60))
            .await
            .unwrap();
        let mut subscription = relay.subscribe(&room_id).await;
        let usecase = DestroyRoomUseCase::new(Arc::new(RoomLifecycle::new(
            store.clone(),
            relay.clone(),
        )));

        // when (操作):
        let result = usecase.execute(&room_id).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(subscription.recv().await.unwrap(), RoomEvent::Destroyed);
        assert_eq!(store.get_meta(&room_id).await.unwrap(), None);
        assert!(store.list_messages(&room_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_destroy_room_twice_is_ok() {
        // テスト項目: 既に破棄済みの Room を再度破棄してもエラーにならない
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new());
        let relay = Arc::new(BroadcastMessageRelay::default());
        let room_id = store
            .create_room(Timestamp::new(0), Duration::from_secs(60))
            .await
            .unwrap();
        let usecase = DestroyRoomUseCase::new(Arc::new(RoomLifecycle::new(store, relay)));

        // when (操作):
        let first = usecase.execute(&room_id).await;
        let second = usecase.execute(&room_id).await;

        // then (期待する結果):
        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
