//! Data Transfer Objects (DTOs) for the chat application.
//!
//! DTOs are organized by protocol:
//! - `http`: HTTP API request/response DTOs
//! - `realtime`: WebSocket push event DTOs

pub mod conversion;
pub mod http;
pub mod realtime;
