//! HTTP error responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}` with
//! the status code matching the error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::ValueObjectError,
    infrastructure::dto::http::ErrorResponse,
    usecase::{
        AuthorizeError, CreateRoomError, DestroyRoomError, ReadRoomError, SendMessageError,
    },
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("{0}")]
    Validation(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RoomNotFound => StatusCode::NOT_FOUND,
            ApiError::RoomFull => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::RoomNotFound => "room-not-found",
            ApiError::RoomFull => "room-full",
            ApiError::Validation(_) => "validation-error",
            ApiError::Unavailable(_) => "store-unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Unavailable(reason) = &self {
            tracing::error!("Store unavailable: {}", reason);
        }
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(e: CreateRoomError) -> Self {
        match e {
            CreateRoomError::Unavailable(reason) => ApiError::Unavailable(reason),
        }
    }
}

impl From<AuthorizeError> for ApiError {
    fn from(e: AuthorizeError) -> Self {
        match e {
            AuthorizeError::RoomNotFound => ApiError::RoomNotFound,
            AuthorizeError::RoomFull => ApiError::RoomFull,
            AuthorizeError::Unavailable(reason) => ApiError::Unavailable(reason),
        }
    }
}

impl From<SendMessageError> for ApiError {
    fn from(e: SendMessageError) -> Self {
        match e {
            SendMessageError::Validation(e) => e.into(),
            SendMessageError::RoomNotFound => ApiError::RoomNotFound,
            SendMessageError::Unavailable(reason) => ApiError::Unavailable(reason),
        }
    }
}

impl From<ReadRoomError> for ApiError {
    fn from(e: ReadRoomError) -> Self {
        match e {
            ReadRoomError::RoomNotFound => ApiError::RoomNotFound,
            ReadRoomError::Unavailable(reason) => ApiError::Unavailable(reason),
        }
    }
}

impl From<DestroyRoomError> for ApiError {
    fn from(e: DestroyRoomError) -> Self {
        match e {
            DestroyRoomError::Unavailable(reason) => ApiError::Unavailable(reason),
        }
    }
}
