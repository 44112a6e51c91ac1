//! MessageRelay trait 定義
//!
//! Room ごとのブロードキャストチャンネルへのイベント配信を抽象化します。
//!
//! ## 配信保証
//!
//! - at-least-once, best-effort, non-durable
//! - 発行時に購読者がいなければ、そのイベントは失われる
//! - 同じ Room・同じ発行者のイベントは発行順に届く

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{Message, RelayError, RoomId};

/// Room channel events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    MessageCreated(Message),
    /// Terminal: the room is gone once this is observed
    Destroyed,
}

/// Live subscription to a room channel
pub type RoomSubscription = broadcast::Receiver<RoomEvent>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRelay: Send + Sync {
    /// Publish to every current subscriber; returns how many received it.
    ///
    /// Never blocks on subscriber presence or speed.
    async fn publish(&self, room_id: &RoomId, event: RoomEvent) -> Result<usize, RelayError>;

    /// Subscribe to a room channel
    async fn subscribe(&self, room_id: &RoomId) -> RoomSubscription;

    /// Drop the room channel; subscribers drain buffered events then see it closed
    async fn close(&self, room_id: &RoomId);

    /// Drop channels nobody listens to, returning how many were dropped
    async fn prune_idle(&self) -> usize;
}
