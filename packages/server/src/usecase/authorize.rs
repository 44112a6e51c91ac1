//! UseCase: 入室判定（AccessGate）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthorizeUseCase::execute() メソッド
//! - トークンなしの参加、既存トークンでの再入室、定員超過、存在しない Room
//!
//! ### なぜこのテストが必要か
//! - 1 つの Room に参加できるのは最大 CAPACITY 人の異なる ID のみ
//! - 同じトークンでの再入室は人数を増やしてはならない（冪等性）
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加、再入室
//! - 異常系：定員超過、存在しない Room
//! - エッジケース：並行した参加要求

use std::sync::Arc;

use crate::domain::{Admission, IdentityToken, RoomId, RoomStore};

use super::error::AuthorizeError;

/// 入室判定の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub room_id: RoomId,
    pub token: IdentityToken,
    /// `true` when `token` was minted by this call and must be handed to the client
    pub newly_issued: bool,
}

/// 入室判定のユースケース
pub struct AuthorizeUseCase {
    store: Arc<dyn RoomStore>,
    /// 1 つの Room に参加できる異なる ID の最大数
    capacity: usize,
}

impl AuthorizeUseCase {
    pub fn new(store: Arc<dyn RoomStore>, capacity: usize) -> Self {
        Self { store, capacity }
    }

    /// 入室判定を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 入室先の Room
    /// * `presented` - クライアントが提示したトークン（無ければ新規参加として扱う）
    ///
    /// # Returns
    ///
    /// * `Ok(Authorization)` - 入室可能（新規トークンの場合は `newly_issued == true`）
    /// * `Err(AuthorizeError)` - Room が存在しない、または満員
    pub async fn execute(
        &self,
        room_id: RoomId,
        presented: Option<IdentityToken>,
    ) -> Result<Authorization, AuthorizeError> {
        let candidate = IdentityToken::generate();
        let admission = self
            .store
            .admit(&room_id, presented, candidate, self.capacity)
            .await?;

        match admission {
            Admission::Reentered(token) => Ok(Authorization {
                room_id,
                token,
                newly_issued: false,
            }),
            Admission::Admitted(token) => {
                tracing::info!("New participant admitted to room '{}'", room_id);
                Ok(Authorization {
                    room_id,
                    token,
                    newly_issued: true,
                })
            }
            Admission::Full => {
                tracing::warn!("Room '{}' is full, rejecting join", room_id);
                Err(AuthorizeError::RoomFull)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomIdFactory, Timestamp},
        infrastructure::repository::InMemoryRoomStore,
    };
    use std::time::Duration;

    async fn create_test_room(store: &InMemoryRoomStore) -> RoomId {
        store
            .create_room(Timestamp::new(0), Duration::from_secs(600))
            .await
            .unwrap()
    }

    async fn member_count(store: &InMemoryRoomStore, room_id: &RoomId) -> usize {
        store
            .get_meta(room_id)
            .await
            .unwrap()
            .map(|meta| meta.member_count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_join_scenario_two_browsers_then_full() {
        // テスト項目: 新規参加 → 再入室 → 2 人目の参加 → 3 人目は満員
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new());
        let room_id = create_test_room(&store).await;
        let usecase = AuthorizeUseCase::new(store.clone(), 2);

        // when (操作): トークンなしで参加
        let first = usecase.execute(room_id.clone(), None).await.unwrap();

        // then (期待する結果):
        assert!(first.newly_issued);
        assert_eq!(member_count(&store, &room_id).await, 1);

        // when (操作): 同じトークンで再入室
        let again = usecase
            .execute(room_id.clone(), Some(first.token.clone()))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!again.newly_issued);
        assert_eq!(again.token, first.token);
        assert_eq!(member_count(&store, &room_id).await, 1);

        // when (操作): 別のブラウザから参加
        let second = usecase.execute(room_id.clone(), None).await.unwrap();

        // then (期待する結果):
        assert!(second.newly_issued);
        assert_ne!(second.token, first.token);
        assert_eq!(member_count(&store, &room_id).await, 2);

        // when (操作): 3 人目
        let third = usecase.execute(room_id.clone(), None).await;

        // then (期待する結果):
        assert_eq!(third, Err(AuthorizeError::RoomFull));
        assert_eq!(member_count(&store, &room_id).await, 2);
    }

    #[tokio::test]
    async fn test_unknown_token_on_full_room_is_rejected() {
        // テスト項目: 満員の Room にメンバーでないトークンを提示しても拒否される
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new());
        let room_id = create_test_room(&store).await;
        let usecase = AuthorizeUseCase::new(store.clone(), 1);
        usecase.execute(room_id.clone(), None).await.unwrap();

        // when (操作):
        let result = usecase
            .execute(room_id.clone(), Some(IdentityToken::generate()))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthorizeError::RoomFull));
    }

    #[tokio::test]
    async fn test_missing_room_is_not_found() {
        // テスト項目: 存在しない Room への入室は RoomNotFound になる
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new());
        let usecase = AuthorizeUseCase::new(store, 2);

        // when (操作):
        let result = usecase.execute(RoomIdFactory::generate(), None).await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthorizeError::RoomNotFound));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_never_over_admit() {
        // テスト項目: 並行した参加要求でも定員を超えて入室させない
        // given (前提条件):
        let store = Arc::new(InMemoryRoomStore::new());
        let room_id = create_test_room(&store).await;
        let usecase = Arc::new(AuthorizeUseCase::new(store.clone(), 2));

        // when (操作):
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let usecase = usecase.clone();
                let room_id = room_id.clone();
                tokio::spawn(async move { usecase.execute(room_id, None).await })
            })
            .collect();
        let mut admitted = 0;
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(AuthorizeError::RoomFull) => full += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        // then (期待する結果):
        assert_eq!(admitted, 2);
        assert_eq!(full, 48);
        assert_eq!(member_count(&store, &room_id).await, 2);
    }
}
