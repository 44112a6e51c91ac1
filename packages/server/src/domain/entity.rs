//! Entities.

use std::collections::HashSet;

use super::value_object::{
    IdentityToken, MessageId, MessageText, RoomId, SenderName, Timestamp,
};

/// Outcome of an admission attempt against a room's membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The presented token was already a member; nothing changed
    Reentered(IdentityToken),
    /// A new member was added with this token
    Admitted(IdentityToken),
    /// No slot left for a new identity
    Full,
}

/// Room metadata: creation time and the set of admitted identity tokens.
///
/// The remaining lifetime is not stored here; it is the store's per-key expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMeta {
    pub room_id: RoomId,
    pub created_at: Timestamp,
    connected_tokens: HashSet<IdentityToken>,
}

impl RoomMeta {
    pub fn new(room_id: RoomId, created_at: Timestamp) -> Self {
        Self {
            room_id,
            created_at,
            connected_tokens: HashSet::new(),
        }
    }

    pub fn is_member(&self, token: &IdentityToken) -> bool {
        self.connected_tokens.contains(token)
    }

    pub fn member_count(&self) -> usize {
        self.connected_tokens.len()
    }

    /// Admit an identity, keeping `member_count() <= capacity`.
    ///
    /// A presented token that is already a member is re-admitted without
    /// mutation. Otherwise `candidate` is added if a slot is free.
    pub fn admit(
        &mut self,
        presented: Option<IdentityToken>,
        candidate: IdentityToken,
        capacity: usize,
    ) -> Admission {
        if let Some(token) = presented
            && self.is_member(&token)
        {
            return Admission::Reentered(token);
        }

        if self.connected_tokens.len() >= capacity {
            return Admission::Full;
        }

        self.connected_tokens.insert(candidate.clone());
        Admission::Admitted(candidate)
    }
}

/// A chat line. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender: SenderName,
    pub text: MessageText,
    pub timestamp: Timestamp,
    /// Author's identity token; disclosed back only to the author
    pub owner_token: IdentityToken,
}

impl Message {
    pub fn new(
        room_id: RoomId,
        sender: SenderName,
        text: MessageText,
        timestamp: Timestamp,
        owner_token: IdentityToken,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            room_id,
            sender,
            text,
            timestamp,
            owner_token,
        }
    }

    pub fn is_owned_by(&self, token: &IdentityToken) -> bool {
        &self.owner_token == token
    }
}
