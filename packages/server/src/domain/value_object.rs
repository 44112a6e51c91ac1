//! Value objects.
//!
//! Each type validates its invariant on construction, so anything holding one
//! can rely on it without re-checking.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a sender display name, in characters
pub const MAX_SENDER_CHARS: usize = 100;

/// Maximum length of a message body, in characters
pub const MAX_TEXT_CHARS: usize = 1000;

const MAX_OPAQUE_ID_CHARS: usize = 64;

fn validate_opaque_id(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    if value.chars().count() > MAX_OPAQUE_ID_CHARS {
        return Err(ValueObjectError::TooLong {
            field,
            max: MAX_OPAQUE_ID_CHARS,
        });
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValueObjectError::InvalidCharacters { field });
    }
    Ok(())
}

fn validate_bounded_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ValueObjectError::TooLong { field, max });
    }
    Ok(())
}

fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Room identifier.
///
/// Restricted to `[A-Za-z0-9_-]` so it can be embedded in a cookie name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_opaque_id("room id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates fresh room identifiers
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId(random_id())
    }
}

/// Opaque, unguessable per-participant credential scoped to one room
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_opaque_id("identity token", &value)?;
        Ok(Self(value))
    }

    /// Mint a new token (122 random bits)
    pub fn generate() -> Self {
        Self(random_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for IdentityToken {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityToken(..)")
    }
}

/// Server-assigned message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn generate() -> Self {
        Self(random_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sender display name (1..=100 characters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderName(String);

impl SenderName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_bounded_text("sender", &value, MAX_SENDER_CHARS)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SenderName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Message body (1..=1000 characters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_bounded_text("text", &value, MAX_TEXT_CHARS)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_rejects_empty_and_unsafe_values() {
        // テスト項目: 空文字やクッキー名に使えない文字を含む RoomId は拒否される
        // given (前提条件):
        let empty = String::new();
        let unsafe_value = "room;path=/".to_string();

        // when (操作):
        let empty_result = RoomId::new(empty);
        let unsafe_result = RoomId::new(unsafe_value);

        // then (期待する結果):
        assert_eq!(
            empty_result,
            Err(ValueObjectError::Empty { field: "room id" })
        );
        assert_eq!(
            unsafe_result,
            Err(ValueObjectError::InvalidCharacters { field: "room id" })
        );
    }

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        // テスト項目: 生成された ID は検証を通過し、互いに異なる
        // given (前提条件):

        // when (操作):
        let room_a = RoomIdFactory::generate();
        let room_b = RoomIdFactory::generate();
        let token = IdentityToken::generate();

        // then (期待する結果):
        assert_ne!(room_a, room_b);
        assert!(RoomId::new(room_a.as_str().to_string()).is_ok());
        assert!(IdentityToken::new(token.as_str().to_string()).is_ok());
        assert_ne!(MessageId::generate(), MessageId::generate());
    }

    #[test]
    fn test_sender_name_length_is_counted_in_characters() {
        // テスト項目: 送信者名の上限はバイトではなく文字数で判定される
        // given (前提条件):
        let at_limit = "é".repeat(MAX_SENDER_CHARS);
        let over_limit = "a".repeat(MAX_SENDER_CHARS + 1);

        // when (操作):
        let ok = SenderName::new(at_limit);
        let too_long = SenderName::new(over_limit);

        // then (期待する結果):
        assert!(ok.is_ok());
        assert_eq!(
            too_long,
            Err(ValueObjectError::TooLong {
                field: "sender",
                max: MAX_SENDER_CHARS
            })
        );
    }

    #[test]
    fn test_message_text_bounds() {
        // テスト項目: 本文は空白のみを拒否し、1000 文字まで許容する
        // given (前提条件):
        let blank = "   ".to_string();
        let at_limit = "x".repeat(MAX_TEXT_CHARS);
        let over_limit = "x".repeat(MAX_TEXT_CHARS + 1);

        // when (操作):

        // then (期待する結果):
        assert_eq!(
            MessageText::new(blank),
            Err(ValueObjectError::Empty { field: "text" })
        );
        assert!(MessageText::new(at_limit).is_ok());
        assert!(MessageText::new(over_limit).is_err());
    }

    #[test]
    fn test_identity_token_debug_does_not_leak_value() {
        // テスト項目: トークンの Debug 表示に値が含まれない
        // given (前提条件):
        let token = IdentityToken::new("secret-token".to_string()).unwrap();

        // when (操作):
        let rendered = format!("{:?}", token);

        // then (期待する結果):
        assert!(!rendered.contains("secret-token"));
    }
}
