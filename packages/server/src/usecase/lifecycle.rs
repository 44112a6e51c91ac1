//! Room lifecycle: TTL renewal on activity, destruction, expiry sweeping.
//!
//! ## 設計ノート
//!
//! - 活動時の TTL 延長は「直近の残り時間」へのリセットであり、最大値への延長ではない
//! - 送信後の TTL 延長はレスポンスとは切り離されたバックグラウンドタスクで行い、
//!   失敗はリトライ後にログへ記録して破棄する
//! - 破棄は「通知 → 削除」の順。通知の失敗は削除を妨げない

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::domain::{MessageRelay, RoomEvent, RoomId, RoomStore, StoreError};

use super::error::DestroyRoomError;

/// Retry settings for housekeeping store calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Delay before the second attempt; grows linearly afterwards
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(100),
        }
    }
}

pub struct RoomLifecycle {
    store: Arc<dyn RoomStore>,
    relay: Arc<dyn MessageRelay>,
    renewal_retry: RetryPolicy,
}

impl RoomLifecycle {
    pub fn new(store: Arc<dyn RoomStore>, relay: Arc<dyn MessageRelay>) -> Self {
        Self {
            store,
            relay,
            renewal_retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.renewal_retry = policy;
        self
    }

    /// Reset both room keys to the room's last-known remaining TTL.
    ///
    /// No-op when the room already expired.
    pub async fn on_activity(&self, room_id: &RoomId) -> Result<(), StoreError> {
        let remaining = self.store.remaining_ttl(room_id).await?;
        if remaining == 0 {
            tracing::debug!("Room '{}' already expired, skipping TTL renewal", room_id);
            return Ok(());
        }
        self.store
            .renew_ttl(room_id, Duration::from_secs(remaining))
            .await
    }

    /// [`Self::on_activity`] with retries on transient store failures.
    ///
    /// Returns whether the renewal went through. Failures are logged, never raised.
    pub async fn renew_with_retry(&self, room_id: &RoomId) -> bool {
        let attempts = self.renewal_retry.attempts.max(1);

        for attempt in 1..=attempts {
            match self.on_activity(room_id).await {
                Ok(()) => return true,
                Err(StoreError::RoomNotFound) => {
                    tracing::debug!("Room '{}' vanished before TTL renewal", room_id);
                    return false;
                }
                Err(StoreError::Unavailable(reason)) if attempt < attempts => {
                    tracing::debug!(
                        "TTL renewal for room '{}' failed (attempt {}/{}): {}",
                        room_id,
                        attempt,
                        attempts,
                        reason
                    );
                    tokio::time::sleep(self.renewal_retry.backoff * attempt).await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Giving up TTL renewal for room '{}' after {} attempts: {}",
                        room_id,
                        attempts,
                        e
                    );
                    return false;
                }
            }
        }

        false
    }

    /// Run the TTL renewal as a detached task, decoupled from the caller's response
    pub fn spawn_renewal(self: &Arc<Self>, room_id: RoomId) -> JoinHandle<bool> {
        let lifecycle = Arc::clone(self);
        tokio::spawn(async move { lifecycle.renew_with_retry(&room_id).await })
    }

    /// Notify viewers, then delete both room keys.
    ///
    /// Safe on rooms that already expired.
    pub async fn on_destroy_request(&self, room_id: &RoomId) -> Result<(), DestroyRoomError> {
        match self.relay.publish(room_id, RoomEvent::Destroyed).await {
            Ok(delivered) => tracing::info!(
                "Destroy notice for room '{}' sent to {} viewers",
                room_id,
                delivered
            ),
            Err(e) => tracing::warn!("Failed to notify viewers of room '{}': {}", room_id, e),
        }

        match self.store.destroy_room(room_id).await {
            Ok(()) | Err(StoreError::RoomNotFound) => {}
            Err(StoreError::Unavailable(reason)) => {
                return Err(DestroyRoomError::Unavailable(reason));
            }
        }

        self.relay.close(room_id).await;
        tracing::info!("Room '{}' destroyed", room_id);
        Ok(())
    }

    /// Reclaim expired keys and idle channels; returns `(keys, channels)` reclaimed
    pub async fn sweep(&self) -> (usize, usize) {
        let keys = self.store.purge_expired().await;
        let channels = self.relay.prune_idle().await;
        if keys > 0 || channels > 0 {
            tracing::debug!(
                "Sweep reclaimed {} expired keys and {} idle channels",
                keys,
                channels
            );
        }
        (keys, channels)
    }

    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let lifecycle = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                lifecycle.sweep().await;
            }
        })
    }
}
