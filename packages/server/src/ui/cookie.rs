//! Identity cookie handling.
//!
//! Each room gets its own cookie, `x-auth-token-<roomId>`, so one browser can
//! hold tokens for several rooms at once.

use std::convert::Infallible;

use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponseParts, ResponseParts},
};

use crate::domain::{IdentityToken, RoomId};

pub const TOKEN_COOKIE_PREFIX: &str = "x-auth-token-";

pub fn cookie_name(room_id: &RoomId) -> String {
    format!("{}{}", TOKEN_COOKIE_PREFIX, room_id.as_str())
}

/// Token presented for `room_id`, if any.
///
/// Malformed values are treated as absent, i.e. as a fresh join attempt.
pub fn read_token(headers: &HeaderMap, room_id: &RoomId) -> Option<IdentityToken> {
    let name = cookie_name(room_id);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| IdentityToken::new(value.trim().to_string()).ok())
}

/// Attributes applied to issued identity cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

/// `Set-Cookie` header for a newly minted token, or nothing
#[derive(Debug, Clone, Default)]
pub struct SessionCookie(Option<HeaderValue>);

impl SessionCookie {
    pub fn none() -> Self {
        Self(None)
    }

    /// `max_age_secs` should be the room's remaining TTL, so the cookie dies with the room.
    pub fn issue(
        room_id: &RoomId,
        token: &IdentityToken,
        max_age_secs: u64,
        policy: CookiePolicy,
    ) -> Self {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
            cookie_name(room_id),
            token.as_str(),
            max_age_secs
        );
        if policy.secure {
            cookie.push_str("; Secure");
        }
        Self(HeaderValue::from_str(&cookie).ok())
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl IntoResponseParts for SessionCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.0 {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomIdFactory;

    #[test]
    fn test_read_token_picks_the_room_cookie() {
        // テスト項目: 複数のクッキーから対象 Room のトークンだけが読み取られる
        // given (前提条件):
        let room_id = RoomIdFactory::generate();
        let other_room = RoomIdFactory::generate();
        let mut headers = HeaderMap::new();
        let cookie = format!(
            "theme=dark; {}=othertoken; {}=mytoken",
            cookie_name(&other_room),
            cookie_name(&room_id)
        );
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        // when (操作):
        let token = read_token(&headers, &room_id);

        // then (期待する結果):
        assert_eq!(token.unwrap().as_str(), "mytoken");
    }

    #[test]
    fn test_read_token_ignores_missing_and_malformed_values() {
        // テスト項目: クッキーが無い・不正な値の場合は None（新規参加扱い）
        // given (前提条件):
        let room_id = RoomIdFactory::generate();
        let mut malformed = HeaderMap::new();
        let cookie = format!("{}=bad value!", cookie_name(&room_id));
        malformed.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        // when (操作):

        // then (期待する結果):
        assert!(read_token(&HeaderMap::new(), &room_id).is_none());
        assert!(read_token(&malformed, &room_id).is_none());
    }

    #[test]
    fn test_issue_sets_security_attributes() {
        // テスト項目: 発行されるクッキーに HttpOnly / SameSite=Strict / Secure が付く
        // given (前提条件):
        let room_id = RoomIdFactory::generate();
        let token = IdentityToken::generate();
        let policy = CookiePolicy { secure: true };

        // when (操作):
        let SessionCookie(value) = SessionCookie::issue(&room_id, &token, 600, policy);
        let value = value.unwrap();
        let rendered = value.to_str().unwrap();

        // then (期待する結果):
        assert!(rendered.starts_with(&format!("{}={}", cookie_name(&room_id), token.as_str())));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Max-Age=600"));
        assert!(rendered.ends_with("; Secure"));
    }
}
