mod http;
mod websocket;

pub use http::{
    create_room, destroy_room, get_messages, get_ttl, health_check, join_room, send_message,
};
pub use websocket::websocket_handler;
