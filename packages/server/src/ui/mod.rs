//! HTTP and realtime surface of the room server.

mod access;
mod cookie;
mod error;
mod handler;
mod server;
mod signal;
mod state;

pub use cookie::{TOKEN_COOKIE_PREFIX, cookie_name};
pub use error::ApiError;
pub use server::Server;
