//! Client-side view of one room's message list.
//!
//! Sends are projected optimistically, then confirmed or rolled back once the
//! server answers. Pushed events are merged by server id. The authoritative
//! list from a refetch always wins, except for optimistic entries that are
//! still in flight.
//!
//! ## 設計ノート
//!
//! - サーバーは一時 ID をエコーしないため、refetch 時の重複排除は
//!   送信者・本文・時刻の近さによるベストエフォート
//! - 自分が送ったメッセージの push は無視し、refetch に任せる
//! - destroy を受け取ったビューは終端状態で、以降の操作はすべて拒否される

use embers_server::infrastructure::dto::{http::MessageDto, realtime::RealtimeEvent};
use thiserror::Error;

/// How close an authoritative message's timestamp must be to an optimistic
/// entry for the two to be considered the same send
pub const DEDUP_WINDOW_MILLIS: i64 = 5_000;

const TEMP_ID_PREFIX: &str = "temp-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
    Confirmed,
    RolledBack,
    /// Terminal: the room was destroyed
    Destroyed,
}

/// Handle for one optimistic send
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TempId(String);

impl TempId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewMessage {
    pub id: String,
    pub sender: String,
    pub text: String,
    pub timestamp: i64,
    /// Sent by this viewer (the server disclosed our owner token)
    pub own: bool,
    /// Not yet confirmed by the server
    pub optimistic: bool,
}

impl ViewMessage {
    fn from_dto(dto: MessageDto) -> Self {
        Self {
            own: dto.owner_token.is_some(),
            id: dto.id,
            sender: dto.sender,
            text: dto.text,
            timestamp: dto.timestamp,
            optimistic: false,
        }
    }

    /// Best-effort match between an optimistic entry and a stored message
    fn matches_send(&self, stored: &ViewMessage) -> bool {
        self.sender == stored.sender
            && self.text == stored.text
            && (self.timestamp - stored.timestamp).abs() <= DEDUP_WINDOW_MILLIS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("room has been destroyed")]
    Destroyed,
    #[error("unknown pending send")]
    UnknownSend,
}

/// Effect of a pushed event on the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A new message from another participant was merged
    Merged(ViewMessage),
    /// Nothing new to show (own message or duplicate); a refetch may still help
    Unchanged,
    /// The room is gone
    Destroyed,
}

impl EventOutcome {
    /// Whether the caller should refetch the authoritative list
    pub fn needs_refetch(&self) -> bool {
        !matches!(self, EventOutcome::Destroyed)
    }
}

pub struct RoomView {
    username: String,
    messages: Vec<ViewMessage>,
    state: SendState,
    next_temp: u64,
}

impl RoomView {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            messages: Vec::new(),
            state: SendState::Idle,
            next_temp: 0,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn messages(&self) -> &[ViewMessage] {
        &self.messages
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == SendState::Destroyed
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.optimistic).count()
    }

    /// Project a message into the list before the server has seen it
    pub fn submit(&mut self, text: impl Into<String>, now_millis: i64) -> Result<TempId, ViewError> {
        self.ensure_alive()?;

        self.next_temp += 1;
        let temp_id = TempId(format!("{}{}", TEMP_ID_PREFIX, self.next_temp));
        self.messages.push(ViewMessage {
            id: temp_id.0.clone(),
            sender: self.username.clone(),
            text: text.into(),
            timestamp: now_millis,
            own: true,
            optimistic: true,
        });
        self.state = SendState::Sending;
        Ok(temp_id)
    }

    /// The server accepted the send and assigned `message_id`
    pub fn confirm(&mut self, temp_id: &TempId, message_id: &str) -> Result<(), ViewError> {
        self.ensure_alive()?;

        let already_listed = self.messages.iter().any(|m| m.id == message_id);
        match self.position_of(temp_id) {
            Some(index) if already_listed => {
                self.messages.remove(index);
            }
            Some(index) => {
                let entry = &mut self.messages[index];
                entry.id = message_id.to_string();
                entry.optimistic = false;
            }
            // Already superseded by a refetch.
            None if already_listed => {}
            None => return Err(ViewError::UnknownSend),
        }

        self.settle(SendState::Confirmed);
        Ok(())
    }

    /// The send failed; drop the optimistic entry so the list is as it was
    pub fn roll_back(&mut self, temp_id: &TempId) -> Result<(), ViewError> {
        self.ensure_alive()?;

        let index = self.position_of(temp_id).ok_or(ViewError::UnknownSend)?;
        self.messages.remove(index);
        self.settle(SendState::RolledBack);
        Ok(())
    }

    /// Replace the list with the server's, keeping sends still in flight.
    ///
    /// Returns the messages that were not in the view before, in list order.
    pub fn refresh(&mut self, authoritative: Vec<MessageDto>) -> Vec<ViewMessage> {
        if self.is_destroyed() {
            return Vec::new();
        }

        let confirmed: Vec<ViewMessage> = authoritative
            .into_iter()
            .map(ViewMessage::from_dto)
            .collect();

        let added: Vec<ViewMessage> = confirmed
            .iter()
            .filter(|m| !self.messages.iter().any(|known| known.id == m.id))
            .cloned()
            .collect();

        // Only messages new to the view can stand in for a pending send,
        // and each one stands in for at most one.
        let mut unclaimed: Vec<&ViewMessage> = added.iter().collect();
        let pending: Vec<ViewMessage> = self
            .messages
            .drain(..)
            .filter(|m| m.optimistic)
            .filter(|m| match unclaimed.iter().position(|stored| m.matches_send(stored)) {
                Some(index) => {
                    unclaimed.remove(index);
                    false
                }
                None => true,
            })
            .collect();

        self.messages = confirmed;
        self.messages.extend(pending);
        if self.state == SendState::Sending && self.pending_count() == 0 {
            self.state = SendState::Confirmed;
        }
        added
    }

    pub fn apply_event(&mut self, event: RealtimeEvent) -> EventOutcome {
        if self.is_destroyed() {
            return EventOutcome::Destroyed;
        }

        match event {
            RealtimeEvent::Destroy(_) => {
                self.messages.clear();
                self.state = SendState::Destroyed;
                EventOutcome::Destroyed
            }
            RealtimeEvent::Message(dto) => {
                if dto.sender == self.username || self.messages.iter().any(|m| m.id == dto.id) {
                    return EventOutcome::Unchanged;
                }
                let message = ViewMessage::from_dto(dto);
                self.messages.push(message.clone());
                EventOutcome::Merged(message)
            }
        }
    }

    /// Treat the room as gone without a pushed event (TTL reached zero, 404)
    pub fn mark_destroyed(&mut self) {
        self.messages.clear();
        self.state = SendState::Destroyed;
    }

    fn ensure_alive(&self) -> Result<(), ViewError> {
        if self.is_destroyed() {
            Err(ViewError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn position_of(&self, temp_id: &TempId) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.optimistic && m.id == temp_id.0)
    }

    fn settle(&mut self, outcome: SendState) {
        self.state = if self.pending_count() > 0 {
            SendState::Sending
        } else {
            outcome
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embers_server::infrastructure::dto::realtime::DestroyPayload;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 楽観的送信の投影、確定、ロールバック
    // - push イベントの ID ベースのマージ、自分のメッセージの無視
    // - refetch 時のベストエフォート重複排除
    // - destroy による終端遷移
    //
    // 【なぜこのテストが必要か】
    // - 送信失敗時に画面の一覧が送信前の状態に戻ることを保証する
    // - 同じメッセージが二重に表示され続けないことを保証する
    // ========================================

    const NOW: i64 = 1_700_000_000_000;

    fn dto(id: &str, sender: &str, text: &str, timestamp: i64, own: bool) -> MessageDto {
        MessageDto {
            id: id.to_string(),
            room_id: "room".to_string(),
            sender: sender.to_string(),
            text: text.to_string(),
            timestamp,
            owner_token: own.then(|| "token".to_string()),
        }
    }

    fn ids(view: &RoomView) -> Vec<&str> {
        view.messages().iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_submit_projects_optimistic_entry() {
        // テスト項目: 送信直後に一時 ID の楽観的メッセージが一覧に追加される
        // given (前提条件):
        let mut view = RoomView::new("alice");

        // when (操作):
        let temp_id = view.submit("hi", NOW).unwrap();

        // then (期待する結果):
        assert_eq!(view.state(), SendState::Sending);
        let entry = &view.messages()[0];
        assert_eq!(entry.id, temp_id.as_str());
        assert!(entry.id.starts_with(TEMP_ID_PREFIX));
        assert!(entry.optimistic);
        assert!(entry.own);
        assert_eq!(entry.sender, "alice");
    }

    #[test]
    fn test_confirm_swaps_in_server_id() {
        // テスト項目: 送信成功でサーバー採番の ID に置き換わり Confirmed になる
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let temp_id = view.submit("hi", NOW).unwrap();

        // when (操作):
        view.confirm(&temp_id, "m1").unwrap();

        // then (期待する結果):
        assert_eq!(view.state(), SendState::Confirmed);
        assert_eq!(ids(&view), vec!["m1"]);
        assert!(!view.messages()[0].optimistic);
    }

    #[test]
    fn test_roll_back_restores_previous_list() {
        // テスト項目: 送信失敗で楽観的メッセージが取り除かれ、送信前の一覧に戻る
        // given (前提条件):
        let mut view = RoomView::new("alice");
        view.refresh(vec![dto("m1", "bob", "hello", NOW - 1000, false)]);
        let before = view.messages().to_vec();
        let temp_id = view.submit("hi", NOW).unwrap();

        // when (操作):
        view.roll_back(&temp_id).unwrap();

        // then (期待する結果):
        assert_eq!(view.state(), SendState::RolledBack);
        assert_eq!(view.messages(), before.as_slice());
    }

    #[test]
    fn test_state_stays_sending_while_other_sends_pending() {
        // テスト項目: 複数の送信が進行中の場合、全て完了するまで Sending のまま
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let first = view.submit("one", NOW).unwrap();
        let second = view.submit("two", NOW).unwrap();

        // when (操作):
        view.confirm(&first, "m1").unwrap();
        let after_first = view.state();
        view.roll_back(&second).unwrap();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(after_first, SendState::Sending);
        assert_eq!(view.state(), SendState::RolledBack);
        assert_eq!(ids(&view), vec!["m1"]);
    }

    #[test]
    fn test_refresh_drops_optimistic_entry_matched_by_content() {
        // テスト項目: refetch で同じ送信者・本文・近い時刻のメッセージがあれば楽観的エントリは消える
        // given (前提条件):
        let mut view = RoomView::new("alice");
        view.submit("hi", NOW).unwrap();

        // when (操作):
        let added = view.refresh(vec![dto("m1", "alice", "hi", NOW + 300, true)]);

        // then (期待する結果):
        assert_eq!(ids(&view), vec!["m1"]);
        assert_eq!(added.len(), 1);
        assert!(added[0].own);
        assert_eq!(view.pending_count(), 0);
        assert_eq!(view.state(), SendState::Confirmed);
    }

    #[test]
    fn test_refresh_keeps_unmatched_pending_send() {
        // テスト項目: 一致しない進行中の送信は refetch 後も末尾に残る
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let temp_id = view.submit("hi", NOW).unwrap();

        // when (操作):
        view.refresh(vec![
            dto("m0", "bob", "earlier", NOW - 500, false),
            // 同じ本文でも時間窓の外
            dto("m1", "alice", "hi", NOW - DEDUP_WINDOW_MILLIS - 1, true),
        ]);

        // then (期待する結果):
        assert_eq!(ids(&view), vec!["m0", "m1", temp_id.as_str()]);
        assert_eq!(view.state(), SendState::Sending);
    }

    #[test]
    fn test_confirm_after_refresh_superseded_entry() {
        // テスト項目: refetch で置き換え済みの送信を確定してもエラーにならず重複もしない
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let temp_id = view.submit("hi", NOW).unwrap();
        view.refresh(vec![dto("m1", "alice", "hi", NOW, true)]);

        // when (操作):
        let result = view.confirm(&temp_id, "m1");

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(ids(&view), vec!["m1"]);
    }

    #[test]
    fn test_repeated_text_keeps_second_send_pending() {
        // テスト項目: 同じ本文を続けて送った場合、確定済みのメッセージが進行中の 2 通目を消さない
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let first = view.submit("ok", NOW).unwrap();
        let second = view.submit("ok", NOW + 1000).unwrap();
        view.confirm(&first, "m1").unwrap();

        // when (操作):
        view.refresh(vec![dto("m1", "alice", "ok", NOW + 200, true)]);
        let pending_after_refresh = view.pending_count();
        let state_after_refresh = view.state();
        let result = view.confirm(&second, "m2");

        // then (期待する結果):
        assert_eq!(pending_after_refresh, 1);
        assert_eq!(state_after_refresh, SendState::Sending);
        assert!(result.is_ok());
        assert_eq!(ids(&view), vec!["m1", "m2"]);
        assert_eq!(view.state(), SendState::Confirmed);
    }

    #[test]
    fn test_one_stored_message_settles_one_pending_send() {
        // テスト項目: 新たに保存された 1 通は、同じ本文の進行中の送信を 1 件だけ置き換える
        // given (前提条件):
        let mut view = RoomView::new("alice");
        view.submit("ok", NOW).unwrap();
        let second = view.submit("ok", NOW + 500).unwrap();

        // when (操作):
        let added = view.refresh(vec![dto("m1", "alice", "ok", NOW + 100, true)]);

        // then (期待する結果):
        assert_eq!(added.len(), 1);
        assert_eq!(view.pending_count(), 1);
        assert_eq!(ids(&view), vec!["m1", second.as_str()]);
        assert_eq!(view.state(), SendState::Sending);
    }

    #[test]
    fn test_refresh_reports_only_new_messages() {
        // テスト項目: refetch で新たに現れたメッセージだけが返される
        // given (前提条件):
        let mut view = RoomView::new("alice");
        view.refresh(vec![dto("m1", "bob", "one", NOW, false)]);

        // when (操作):
        let added = view.refresh(vec![
            dto("m1", "bob", "one", NOW, false),
            dto("m2", "bob", "two", NOW + 1, false),
        ]);

        // then (期待する結果):
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].id, "m2");
    }

    #[test]
    fn test_pushed_message_from_other_sender_is_merged_once() {
        // テスト項目: 他者のメッセージは ID が未登録の場合だけ追加される
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let event = RealtimeEvent::Message(dto("m1", "bob", "hello", NOW, false));

        // when (操作):
        let first = view.apply_event(event.clone());
        let second = view.apply_event(event);

        // then (期待する結果):
        assert!(matches!(first, EventOutcome::Merged(ref m) if m.id == "m1"));
        assert_eq!(second, EventOutcome::Unchanged);
        assert!(second.needs_refetch());
        assert_eq!(ids(&view), vec!["m1"]);
    }

    #[test]
    fn test_pushed_own_message_is_left_to_refetch() {
        // テスト項目: 自分の送ったメッセージの push は一覧に追加しない
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let temp_id = view.submit("hi", NOW).unwrap();

        // when (操作):
        let outcome = view.apply_event(RealtimeEvent::Message(dto("m1", "alice", "hi", NOW, false)));

        // then (期待する結果):
        assert_eq!(outcome, EventOutcome::Unchanged);
        assert_eq!(ids(&view), vec![temp_id.as_str()]);
    }

    #[test]
    fn test_destroy_is_terminal() {
        // テスト項目: destroy 受信後はビューが終端状態になり、以降の操作は拒否される
        // given (前提条件):
        let mut view = RoomView::new("alice");
        view.refresh(vec![dto("m1", "bob", "hello", NOW, false)]);
        let temp_id = view.submit("hi", NOW).unwrap();

        // when (操作):
        let outcome = view.apply_event(RealtimeEvent::Destroy(DestroyPayload { is_destroyed: true }));

        // then (期待する結果):
        assert_eq!(outcome, EventOutcome::Destroyed);
        assert!(!outcome.needs_refetch());
        assert!(view.is_destroyed());
        assert!(view.messages().is_empty());
        assert_eq!(view.submit("again", NOW), Err(ViewError::Destroyed));
        assert_eq!(view.confirm(&temp_id, "m2"), Err(ViewError::Destroyed));
        assert!(view.refresh(vec![dto("m3", "bob", "late", NOW, false)]).is_empty());
        assert!(view.messages().is_empty());
        assert_eq!(
            view.apply_event(RealtimeEvent::Message(dto("m4", "bob", "late", NOW, false))),
            EventOutcome::Destroyed
        );
    }

    #[test]
    fn test_unknown_send_is_reported() {
        // テスト項目: 存在しない一時 ID のロールバックはエラーになる
        // given (前提条件):
        let mut view = RoomView::new("alice");
        let temp_id = view.submit("hi", NOW).unwrap();
        view.roll_back(&temp_id).unwrap();

        // when (操作):
        let result = view.roll_back(&temp_id);

        // then (期待する結果):
        assert_eq!(result, Err(ViewError::UnknownSend));
    }
}
