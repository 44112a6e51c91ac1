//! InMemory Room Store 実装
//!
//! ドメイン層が定義する RoomStore trait の具体的な実装。
//! キーごとに有効期限を持つ HashMap を、リモートの key/value ストアの代わりに使用します。
//!
//! 期限切れのキーは読み取り時に破棄され（lazy expiry）、
//! `purge_expired` でまとめて回収されます。
//! すべての操作は 1 つのロックの中で完結するため、キー単位でアトミックです。

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tokio::{sync::Mutex, time::Instant};

use crate::domain::{
    Admission, IdentityToken, Message, RoomId, RoomIdFactory, RoomMeta, RoomStore, StoreError,
    Timestamp,
};

const META_PREFIX: &str = "meta:";
const MESSAGES_PREFIX: &str = "messages:";

fn meta_key(room_id: &RoomId) -> String {
    format!("{}{}", META_PREFIX, room_id.as_str())
}

fn messages_key(room_id: &RoomId) -> String {
    format!("{}{}", MESSAGES_PREFIX, room_id.as_str())
}

enum Value {
    Meta(RoomMeta),
    Messages(Vec<Message>),
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Default)]
struct Keyspace {
    entries: HashMap<String, Entry>,
}

impl Keyspace {
    /// Live entry for `key`, evicting it first if it has expired
    fn live_mut(&mut self, key: &str, now: Instant) -> Option<&mut Entry> {
        if self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_live(now))
        {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn meta_mut(&mut self, room_id: &RoomId, now: Instant) -> Option<(&mut RoomMeta, Instant)> {
        match self.live_mut(&meta_key(room_id), now) {
            Some(Entry {
                value: Value::Meta(meta),
                expires_at,
            }) => Some((meta, *expires_at)),
            _ => None,
        }
    }
}

/// インメモリ Room Store 実装
#[derive(Default)]
pub struct InMemoryRoomStore {
    keyspace: Mutex<Keyspace>,
}

impl InMemoryRoomStore {
    /// 新しい InMemoryRoomStore を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn create_room(
        &self,
        created_at: Timestamp,
        ttl: Duration,
    ) -> Result<RoomId, StoreError> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;

        let mut room_id = RoomIdFactory::generate();
        while keyspace.live_mut(&meta_key(&room_id), now).is_some() {
            room_id = RoomIdFactory::generate();
        }

        keyspace.entries.insert(
            meta_key(&room_id),
            Entry {
                value: Value::Meta(RoomMeta::new(room_id.clone(), created_at)),
                expires_at: now + ttl,
            },
        );

        Ok(room_id)
    }

    async fn get_meta(&self, room_id: &RoomId) -> Result<Option<RoomMeta>, StoreError> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;
        Ok(keyspace.meta_mut(room_id, now).map(|(meta, _)| meta.clone()))
    }

    async fn remaining_ttl(&self, room_id: &RoomId) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;
        Ok(keyspace
            .meta_mut(room_id, now)
            .map(|(_, expires_at)| expires_at.saturating_duration_since(now).as_secs())
            .unwrap_or(0))
    }

    async fn admit(
        &self,
        room_id: &RoomId,
        presented: Option<IdentityToken>,
        candidate: IdentityToken,
        capacity: usize,
    ) -> Result<Admission, StoreError> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;
        let (meta, _) = keyspace
            .meta_mut(room_id, now)
            .ok_or(StoreError::RoomNotFound)?;
        Ok(meta.admit(presented, candidate, capacity))
    }

    async fn append_message(&self, message: Message) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;

        // Checked before touching the list so no orphaned history is written.
        let (_, expires_at) = keyspace
            .meta_mut(&message.room_id, now)
            .ok_or(StoreError::RoomNotFound)?;

        let key = messages_key(&message.room_id);
        match keyspace.live_mut(&key, now) {
            Some(Entry {
                value: Value::Messages(messages),
                expires_at: list_expires_at,
            }) => {
                messages.push(message);
                *list_expires_at = expires_at;
            }
            _ => {
                keyspace.entries.insert(
                    key,
                    Entry {
                        value: Value::Messages(vec![message]),
                        expires_at,
                    },
                );
            }
        }

        Ok(())
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StoreError> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;
        match keyspace.live_mut(&messages_key(room_id), now) {
            Some(Entry {
                value: Value::Messages(messages),
                ..
            }) => Ok(messages.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn renew_ttl(&self, room_id: &RoomId, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;

        let Some((_, current)) = keyspace.meta_mut(room_id, now) else {
            return Ok(());
        };
        let deadline = current.max(now + ttl);

        for key in [meta_key(room_id), messages_key(room_id)] {
            if let Some(entry) = keyspace.live_mut(&key, now) {
                entry.expires_at = deadline;
            }
        }

        Ok(())
    }

    async fn destroy_room(&self, room_id: &RoomId) -> Result<(), StoreError> {
        let mut keyspace = self.keyspace.lock().await;
        keyspace.entries.remove(&meta_key(room_id));
        keyspace.entries.remove(&messages_key(room_id));
        Ok(())
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;
        let before = keyspace.entries.len();
        keyspace.entries.retain(|_, entry| entry.is_live(now));
        before - keyspace.entries.len()
    }
}

#[cfg(test)]
impl InMemoryRoomStore {
    /// Remaining lifetime of each room key, for lock-step assertions
    pub(crate) async fn key_deadlines(&self, room_id: &RoomId) -> (Option<Instant>, Option<Instant>) {
        let keyspace = self.keyspace.lock().await;
        (
            keyspace
                .entries
                .get(&meta_key(room_id))
                .map(|e| e.expires_at),
            keyspace
                .entries
                .get(&messages_key(room_id))
                .map(|e| e.expires_at),
        )
    }
}
