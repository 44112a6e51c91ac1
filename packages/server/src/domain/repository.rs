//! RoomStore trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 保存レイアウト
//!
//! 1 つの Room につき 2 つのキーを持ちます。
//!
//! - `meta:<roomId>`: 作成時刻とメンバーのトークン集合
//! - `messages:<roomId>`: メッセージ履歴（追記のみ）
//!
//! 2 つのキーは常に同じ有効期限を持ちます。

use std::time::Duration;

use async_trait::async_trait;

use super::{Admission, IdentityToken, Message, RoomId, RoomMeta, StoreError, Timestamp};

/// Room Store trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
/// 実装はすべての操作をキー単位でアトミックに行う必要がある。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// 新しい Room を作成し、初期 TTL を設定する
    async fn create_room(&self, created_at: Timestamp, ttl: Duration)
    -> Result<RoomId, StoreError>;

    /// Room のメタデータを取得（存在しない・期限切れの場合は `None`）
    async fn get_meta(&self, room_id: &RoomId) -> Result<Option<RoomMeta>, StoreError>;

    /// 残り TTL を秒で取得（存在しない・期限切れの場合は 0）
    async fn remaining_ttl(&self, room_id: &RoomId) -> Result<u64, StoreError>;

    /// メンバーシップの判定と追加を 1 つのアトミックな操作として行う
    ///
    /// 同じ Room への並行した参加要求が、残り 1 枠を同時に獲得することはない。
    async fn admit(
        &self,
        room_id: &RoomId,
        presented: Option<IdentityToken>,
        candidate: IdentityToken,
        capacity: usize,
    ) -> Result<Admission, StoreError>;

    /// メッセージを履歴の末尾に追加（メタデータが無ければ `RoomNotFound`）
    async fn append_message(&self, message: Message) -> Result<(), StoreError>;

    /// 履歴を追加順で取得
    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StoreError>;

    /// 両方のキーの有効期限を同じ値に延長する（既存のより長い TTL は短縮しない）
    async fn renew_ttl(&self, room_id: &RoomId, ttl: Duration) -> Result<(), StoreError>;

    /// 両方のキーを削除する（既に期限切れでもエラーにしない）
    async fn destroy_room(&self, room_id: &RoomId) -> Result<(), StoreError>;

    /// 期限切れのキーを回収し、回収したキー数を返す
    async fn purge_expired(&self) -> usize {
        0
    }
}
