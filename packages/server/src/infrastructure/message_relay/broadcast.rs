//! tokio broadcast チャンネルを使った MessageRelay 実装
//!
//! ## 責務
//!
//! - Room ごとの `broadcast::Sender` を管理
//! - 購読（subscribe）と発行（publish）
//!
//! ## 設計ノート
//!
//! 購読者がいない Room への発行は、チャンネルを作らずに捨てられます（non-durable）。
//! 1 つの Room のイベントは 1 つのチャンネルを通るため、購読者には発行順に届きます。
//! 遅い購読者はバッファを溢れさせて `Lagged` を受け取るだけで、発行者を止めることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};

use crate::domain::{MessageRelay, RelayError, RoomEvent, RoomId, RoomSubscription};

/// Per-subscriber buffer before a slow viewer starts lagging
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// broadcast チャンネルを使った MessageRelay 実装
pub struct BroadcastMessageRelay {
    /// Key: RoomId, Value: チャンネルの送信側
    channels: Mutex<HashMap<RoomId, broadcast::Sender<RoomEvent>>>,
    capacity: usize,
}

impl BroadcastMessageRelay {
    /// 新しい BroadcastMessageRelay を作成
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }
}

impl Default for BroadcastMessageRelay {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl MessageRelay for BroadcastMessageRelay {
    async fn publish(&self, room_id: &RoomId, event: RoomEvent) -> Result<usize, RelayError> {
        let channels = self.channels.lock().await;

        let Some(sender) = channels.get(room_id) else {
            tracing::debug!("No channel for room '{}', event dropped", room_id);
            return Ok(0);
        };

        // send() only fails when nobody is subscribed; that is not an error here.
        let delivered = sender.send(event).unwrap_or(0);
        tracing::debug!(
            "Published event to room '{}' ({} subscribers)",
            room_id,
            delivered
        );
        Ok(delivered)
    }

    async fn subscribe(&self, room_id: &RoomId) -> RoomSubscription {
        let mut channels = self.channels.lock().await;
        let sender = channels
            .entry(room_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tracing::debug!("New subscriber for room '{}'", room_id);
        sender.subscribe()
    }

    async fn close(&self, room_id: &RoomId) {
        let mut channels = self.channels.lock().await;
        if channels.remove(room_id).is_some() {
            tracing::debug!("Closed channel for room '{}'", room_id);
        }
    }

    async fn prune_idle(&self) -> usize {
        let mut channels = self.channels.lock().await;
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }
}
