//! Client execution logic with reconnection support.

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    api::RoomApi,
    error::ClientError,
    session::{SessionEnd, run_room_session},
    ui::spawn_line_reader,
    username::{UsernameStore, default_username_path},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Which room to enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomTarget {
    /// Create a fresh room and enter it
    Create,
    /// Enter an existing room by id
    Join(String),
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that ended the session
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // A missing or full room will not come back
    if error.is_terminal() || matches!(error, ClientError::Io(_)) {
        return false;
    }

    current_attempt < max_attempts
}

/// Run the chat room client
///
/// # Arguments
///
/// * `url` - Server root URL
/// * `username_file` - Where the display name is persisted (defaults to `~/.embers/username`)
/// * `target` - Room to create or join
pub async fn run_client(
    url: String,
    username_file: Option<PathBuf>,
    target: RoomTarget,
) -> Result<(), ClientError> {
    let username_path = username_file.or_else(default_username_path).ok_or_else(|| {
        ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no home directory found, pass --username-file",
        ))
    })?;
    let username = UsernameStore::new(username_path).load_or_create()?;

    let api = Arc::new(RoomApi::new(&url)?);
    let room_id = match target {
        RoomTarget::Create => {
            let room_id = api.create_room().await?;
            println!("Created room {}", room_id);
            println!("Share this id so the other participant can join.");
            room_id
        }
        RoomTarget::Join(room_id) => room_id,
    };

    // One reader for the whole process, so reconnects do not compete for stdin.
    let mut input_rx = spawn_line_reader(&username);
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Entering room {} as '{}' (attempt {}/{})",
            room_id,
            username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_room_session(api.clone(), &room_id, &username, &mut input_rx).await {
            Ok(SessionEnd::Quit) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Ok(SessionEnd::Destroyed) => {
                tracing::info!("Room {} is gone", room_id);
                break;
            }
            Err(e) => {
                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    return Err(e);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;
                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_not_reconnect_to_missing_or_full_room() {
        // テスト項目: Room が存在しない・満員の場合は再接続しない
        // given (前提条件):
        let not_found = ClientError::RoomNotFound;
        let full = ClientError::RoomFull;

        // when (操作):

        // then (期待する結果):
        assert!(!should_attempt_reconnect(&not_found, 0, 5));
        assert!(!should_attempt_reconnect(&full, 0, 5));
    }

    #[test]
    fn test_should_reconnect_after_connection_loss_within_limit() {
        // テスト項目: 接続断は上限回数まで再接続する
        // given (前提条件):
        let error = ClientError::Realtime(
            tokio_tungstenite::tungstenite::Error::ConnectionClosed,
        );

        // when (操作):

        // then (期待する結果):
        assert!(should_attempt_reconnect(&error, 0, 5));
        assert!(should_attempt_reconnect(&error, 4, 5));
        assert!(!should_attempt_reconnect(&error, 5, 5));
    }

    #[test]
    fn test_should_not_reconnect_on_local_io_failure() {
        // テスト項目: ローカルの I/O エラーでは再接続しない
        // given (前提条件):
        let error = ClientError::Io(std::io::Error::other("disk full"));

        // when (操作):

        // then (期待する結果):
        assert!(!should_attempt_reconnect(&error, 0, 5));
    }
}
