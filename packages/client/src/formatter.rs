//! Message formatting utilities for client display.

use embers_shared::time::{format_time_remaining, timestamp_to_local_clock};

use crate::reconciler::ViewMessage;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Banner shown when entering a room
    ///
    /// # Arguments
    ///
    /// * `room_id` - The room being entered
    /// * `username` - This client's display name
    /// * `ttl_secs` - Remaining lifetime of the room
    pub fn format_room_entered(room_id: &str, username: &str, ttl_secs: u64) -> String {
        format!(
            "\n{RULE}\nRoom: {room_id}\nYou are '{username}'. Self-destructs in {}.\n\
             Commands: /ttl  /destroy  /quit\n{RULE}\n",
            format_time_remaining(ttl_secs)
        )
    }

    /// A single chat line
    pub fn format_message(message: &ViewMessage) -> String {
        let me_suffix = if message.own { " (me)" } else { "" };
        let pending_suffix = if message.optimistic { " …" } else { "" };
        format!(
            "[{}] {}{}: {}{}\n",
            timestamp_to_local_clock(message.timestamp),
            message.sender,
            me_suffix,
            message.text,
            pending_suffix
        )
    }

    /// The whole history, or a placeholder when empty
    pub fn format_history(messages: &[ViewMessage]) -> String {
        if messages.is_empty() {
            return "(No messages yet)\n".to_string();
        }
        messages.iter().map(Self::format_message).collect()
    }

    pub fn format_sent_confirmation(sent_at: i64) -> String {
        format!("sent at {}\n", timestamp_to_local_clock(sent_at))
    }

    pub fn format_send_failed(reason: &str) -> String {
        format!("✗ message not sent: {}\n", reason)
    }

    pub fn format_time_remaining(ttl_secs: u64) -> String {
        format!("Self-destructs in {}\n", format_time_remaining(ttl_secs))
    }

    pub fn format_destroyed() -> String {
        format!("\n{RULE}\nThis room has been destroyed.\n{RULE}\n")
    }
}
