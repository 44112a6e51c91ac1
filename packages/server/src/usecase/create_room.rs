//! UseCase: Room 作成

use std::{sync::Arc, time::Duration};

use embers_shared::time::Clock;

use crate::domain::{RoomId, RoomStore, Timestamp};

use super::error::CreateRoomError;

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    store: Arc<dyn RoomStore>,
    clock: Arc<dyn Clock>,
    /// 新しい Room の初期 TTL
    room_ttl: Duration,
}

impl CreateRoomUseCase {
    pub fn new(store: Arc<dyn RoomStore>, clock: Arc<dyn Clock>, room_ttl: Duration) -> Self {
        Self {
            store,
            clock,
            room_ttl,
        }
    }

    /// 空の Room を作成し、その ID を返す
    pub async fn execute(&self) -> Result<RoomId, CreateRoomError> {
        let created_at = Timestamp::new(self.clock.now_millis());
        let room_id = self.store.create_room(created_at, self.room_ttl).await?;
        tracing::info!(
            "Room '{}' created (ttl {}s)",
            room_id,
            self.room_ttl.as_secs()
        );
        Ok(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::StoreError, infrastructure::repository::InMemoryRoomStore};
    use crate::domain::repository::MockRoomStore;
    use embers_shared::time::FixedClock;

    #[tokio::test]
    async fn test_create_room_success() {
        // テスト項目: Room が作成され、作成時刻と初期 TTL が設定される
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new());
        let usecase = CreateRoomUseCase::new(
            store.clone(),
            Arc::new(FixedClock::new(1_700_000_000_000)),
            Duration::from_secs(600),
        );

        // when (操作):
        let room_id = usecase.execute().await.unwrap();

        // then (期待する結果):
        let meta = store.get_meta(&room_id).await.unwrap().unwrap();
        assert_eq!(meta.created_at, Timestamp::new(1_700_000_000_000));
        let ttl = store.remaining_ttl(&room_id).await.unwrap();
        assert!(ttl > 590 && ttl <= 600);
    }

    #[tokio::test]
    async fn test_create_room_store_unavailable() {
        // テスト項目: ストア障害は CreateRoomError として返される
        // given (前提条件):
        let mut store = MockRoomStore::new();
        store
            .expect_create_room()
            .returning(|_, _| Err(StoreError::Unavailable("down".to_string())));
        let usecase = CreateRoomUseCase::new(
            Arc::new(store),
            Arc::new(FixedClock::new(0)),
            Duration::from_secs(600),
        );

        // when (操作):
        let result = usecase.execute().await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreateRoomError::Unavailable(_))));
    }
}
