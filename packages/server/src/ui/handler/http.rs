//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        CreateRoomResponse, JoinRoomResponse, MessageDto, MessagesResponse, SendMessageRequest,
        SendMessageResponse, TtlResponse,
    },
    ui::{
        access::RoomRequest,
        cookie::SessionCookie,
        error::ApiError,
        state::AppState,
    },
    usecase::{MessageDraft, ReadRoomError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `POST /room/create`
pub async fn create_room(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CreateRoomResponse>, ApiError> {
    let room_id = state.create_room_usecase.execute().await?;
    Ok(Json(CreateRoomResponse {
        room_id: room_id.into_string(),
    }))
}

/// `POST /room/join?roomId=`
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    request: RoomRequest,
) -> Result<(SessionCookie, Json<JoinRoomResponse>), ApiError> {
    let access = state.authorize(request).await?;
    Ok((
        access.cookie,
        Json(JoinRoomResponse {
            room_id: access.room_id.into_string(),
        }),
    ))
}

/// `GET /room/ttl?roomId=`
pub async fn get_ttl(
    State(state): State<Arc<AppState>>,
    request: RoomRequest,
) -> Result<(SessionCookie, Json<TtlResponse>), ApiError> {
    let access = state.authorize(request).await?;
    let ttl = match state.get_ttl_usecase.execute(&access.room_id).await {
        Ok(ttl) => ttl,
        // Expired between the gate and the read.
        Err(ReadRoomError::RoomNotFound) => 0,
        Err(e) => return Err(e.into()),
    };
    Ok((access.cookie, Json(TtlResponse { ttl })))
}

/// `DELETE /room?roomId=`
pub async fn destroy_room(
    State(state): State<Arc<AppState>>,
    request: RoomRequest,
) -> Result<StatusCode, ApiError> {
    let access = state.authorize(request).await?;
    state.destroy_room_usecase.execute(&access.room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /messages?roomId=`
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    request: RoomRequest,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(SessionCookie, Json<SendMessageResponse>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    // Validate before the gate so a rejected body never consumes a seat.
    let draft = MessageDraft::parse(body.sender, body.text)?;
    let access = state.authorize(request).await?;

    let message_id = state
        .send_message_usecase
        .execute(&access.room_id, access.token, draft)
        .await?;

    Ok((
        access.cookie,
        Json(SendMessageResponse {
            success: true,
            message_id: message_id.into_string(),
        }),
    ))
}

/// `GET /messages?roomId=`
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    request: RoomRequest,
) -> Result<(SessionCookie, Json<MessagesResponse>), ApiError> {
    let access = state.authorize(request).await?;
    let messages = state.get_messages_usecase.execute(&access.room_id).await?;

    // Domain Model から DTO への変換
    let messages = messages
        .into_iter()
        .map(|message| MessageDto::for_viewer(message, Some(&access.token)))
        .collect();

    Ok((access.cookie, Json(MessagesResponse { messages })))
}
