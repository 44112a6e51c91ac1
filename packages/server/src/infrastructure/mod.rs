//! Infrastructure layer: concrete store and relay implementations, wire DTOs.

pub mod dto;
pub mod message_relay;
pub mod repository;
