//! Room-scoped request parsing.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use crate::{
    domain::{IdentityToken, RoomId},
    infrastructure::dto::http::RoomQuery,
};

use super::{cookie, cookie::SessionCookie, error::ApiError};

/// `?roomId=` plus whatever identity cookie the caller presented for that room.
///
/// Extraction does not touch the store; handlers run the access gate
/// themselves through [`super::state::AppState::authorize`].
#[derive(Debug, Clone)]
pub struct RoomRequest {
    pub room_id: RoomId,
    pub presented: Option<IdentityToken>,
}

impl<S> FromRequestParts<S> for RoomRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<RoomQuery>::try_from_uri(&parts.uri)
            .map_err(|_| ApiError::Validation("roomId is required".to_string()))?;

        // An id that could never have been issued names no room.
        let room_id = RoomId::new(query.room_id).map_err(|_| ApiError::RoomNotFound)?;
        let presented = cookie::read_token(&parts.headers, &room_id);

        Ok(Self { room_id, presented })
    }
}

/// A request that passed the access gate
#[derive(Debug)]
pub struct RoomAccess {
    pub room_id: RoomId,
    pub token: IdentityToken,
    /// Set when the gate minted a new token for this caller
    pub cookie: SessionCookie,
}
