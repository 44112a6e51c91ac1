//! Interactive room session.
//!
//! One loop multiplexes keyboard input, send results, realtime frames and
//! the local self-destruct countdown, feeding all of them through [`RoomView`].

use std::{sync::Arc, time::Duration};

use embers_server::infrastructure::dto::realtime::RealtimeEvent;
use embers_shared::time::get_unix_timestamp_millis;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, protocol::Message};

use crate::{
    api::RoomApi,
    error::ClientError,
    formatter::MessageFormatter,
    reconciler::{EventOutcome, RoomView, TempId},
    ui::redisplay_prompt,
};

/// How a session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Destroyed,
}

/// Parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Say(String),
    Ttl,
    Destroy,
    Help,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => Input::Quit,
            "/ttl" => Input::Ttl,
            "/destroy" => Input::Destroy,
            "/help" => Input::Help,
            text => Input::Say(text.to_string()),
        }
    }
}

type SendOutcome = (TempId, i64, Result<String, ClientError>);

struct Session {
    api: Arc<RoomApi>,
    room_id: String,
    view: RoomView,
    remaining_secs: u64,
}

impl Session {
    fn print(&self, text: &str) {
        print!("\n{}", text);
        redisplay_prompt(self.view.username());
    }

    fn end_destroyed(&mut self) -> SessionEnd {
        self.view.mark_destroyed();
        print!("{}", MessageFormatter::format_destroyed());
        SessionEnd::Destroyed
    }

    /// Pull the authoritative list and show anything not seen yet
    async fn refetch(&mut self) -> Result<Option<SessionEnd>, ClientError> {
        match self.api.messages(&self.room_id).await {
            Ok(messages) => {
                let added = self.view.refresh(messages);
                if !added.is_empty() {
                    self.print(&MessageFormatter::format_history(&added));
                }
                Ok(None)
            }
            Err(ClientError::RoomNotFound) => Ok(Some(self.end_destroyed())),
            Err(e) => {
                // The next event or send triggers another refetch.
                tracing::warn!("Failed to refresh messages: {}", e);
                Ok(None)
            }
        }
    }

    async fn on_send_outcome(&mut self, outcome: SendOutcome) -> Result<Option<SessionEnd>, ClientError> {
        let (temp_id, sent_at, result) = outcome;
        match result {
            Ok(message_id) => {
                if let Err(e) = self.view.confirm(&temp_id, &message_id) {
                    tracing::debug!("Confirmation for {} ignored: {}", temp_id.as_str(), e);
                }
                self.print(&MessageFormatter::format_sent_confirmation(sent_at));
                self.refetch().await
            }
            Err(ClientError::RoomNotFound) => Ok(Some(self.end_destroyed())),
            Err(e) => {
                if let Err(e) = self.view.roll_back(&temp_id) {
                    tracing::debug!("Rollback for {} ignored: {}", temp_id.as_str(), e);
                }
                self.print(&MessageFormatter::format_send_failed(&e.to_string()));
                Ok(None)
            }
        }
    }

    async fn on_frame(&mut self, text: &str) -> Result<Option<SessionEnd>, ClientError> {
        let event = match serde_json::from_str::<RealtimeEvent>(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Ignoring malformed realtime frame: {}", e);
                return Ok(None);
            }
        };

        let outcome = self.view.apply_event(event);
        match &outcome {
            EventOutcome::Destroyed => return Ok(Some(self.end_destroyed())),
            EventOutcome::Merged(message) => self.print(&MessageFormatter::format_message(message)),
            EventOutcome::Unchanged => {}
        }
        if outcome.needs_refetch() {
            return self.refetch().await;
        }
        Ok(None)
    }

    async fn on_ttl_request(&mut self) -> Result<Option<SessionEnd>, ClientError> {
        match self.api.ttl(&self.room_id).await {
            Ok(0) | Err(ClientError::RoomNotFound) => Ok(Some(self.end_destroyed())),
            Ok(ttl) => {
                self.remaining_secs = ttl;
                self.print(&MessageFormatter::format_time_remaining(ttl));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Run an interactive session in `room_id` until the user quits or the room is gone.
///
/// # Arguments
///
/// * `api` - API client holding this user's identity cookies
/// * `room_id` - Room to enter
/// * `username` - Display name used as the message sender
/// * `input_rx` - Lines typed by the user
pub async fn run_room_session(
    api: Arc<RoomApi>,
    room_id: &str,
    username: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<SessionEnd, ClientError> {
    api.join(room_id).await?;

    let remaining_secs = api.ttl(room_id).await?;
    let mut session = Session {
        api: api.clone(),
        room_id: room_id.to_string(),
        view: RoomView::new(username),
        remaining_secs,
    };
    if remaining_secs == 0 {
        return Ok(session.end_destroyed());
    }

    session.view.refresh(api.messages(room_id).await?);
    let realtime = api.connect_realtime(room_id).await?;
    tracing::info!("Connected to room '{}'", room_id);

    print!(
        "{}{}",
        MessageFormatter::format_room_entered(room_id, username, remaining_secs),
        MessageFormatter::format_history(session.view.messages())
    );
    redisplay_prompt(username);

    let (mut write, mut read) = realtime.split();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<SendOutcome>();
    let mut countdown = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    countdown.tick().await;

    let end = loop {
        let step = tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break SessionEnd::Quit;
                };
                match Input::parse(&line) {
                    Input::Quit => break SessionEnd::Quit,
                    Input::Help => {
                        session.print("Commands: /ttl  /destroy  /quit\n");
                        Ok(None)
                    }
                    Input::Ttl => session.on_ttl_request().await,
                    Input::Destroy => match api.destroy(room_id).await {
                        Ok(()) | Err(ClientError::RoomNotFound) => Ok(Some(session.end_destroyed())),
                        Err(e) => {
                            session.print(&format!("✗ destroy failed: {}\n", e));
                            Ok(None)
                        }
                    },
                    Input::Say(text) => {
                        let sent_at = get_unix_timestamp_millis();
                        match session.view.submit(text.clone(), sent_at) {
                            Ok(temp_id) => {
                                let api = api.clone();
                                let room_id = room_id.to_string();
                                let sender = username.to_string();
                                let outcome_tx = outcome_tx.clone();
                                // Sends run detached so incoming events keep flowing meanwhile.
                                tokio::spawn(async move {
                                    let result = api.send_message(&room_id, &sender, &text).await;
                                    let _ = outcome_tx.send((temp_id, sent_at, result));
                                });
                                Ok(None)
                            }
                            Err(_) => Ok(Some(session.end_destroyed())),
                        }
                    }
                }
            }
            Some(outcome) = outcome_rx.recv() => session.on_send_outcome(outcome).await,
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => session.on_frame(text.as_str()).await,
                Some(Ok(Message::Close(_))) | None => {
                    Err(ClientError::Realtime(tungstenite::Error::ConnectionClosed))
                }
                Some(Err(e)) => Err(e.into()),
                // Ping/pong is handled by the WebSocket protocol layer
                Some(Ok(_)) => Ok(None),
            },
            _ = countdown.tick() => {
                session.remaining_secs = session.remaining_secs.saturating_sub(1);
                if session.remaining_secs == 0 {
                    Ok(Some(session.end_destroyed()))
                } else {
                    Ok(None)
                }
            }
        };

        match step {
            Ok(None) => continue,
            Ok(Some(end)) => break end,
            Err(e) => return Err(e),
        }
    };

    let _ = write.send(Message::Close(None)).await;
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_parse_commands() {
        // テスト項目: スラッシュコマンドが認識され、それ以外はメッセージとして扱われる
        // given (前提条件):
        let lines = ["/quit", "/exit", "/ttl", "/destroy", "/help", "hello /ttl"];

        // when (操作):
        let parsed: Vec<Input> = lines.iter().map(|line| Input::parse(line)).collect();

        // then (期待する結果):
        assert_eq!(
            parsed,
            vec![
                Input::Quit,
                Input::Quit,
                Input::Ttl,
                Input::Destroy,
                Input::Help,
                Input::Say("hello /ttl".to_string()),
            ]
        );
    }
}
