//! Command-line client for self-destructing chat rooms.

pub mod api;
pub mod error;
pub mod reconciler;
pub mod username;

mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::{RoomTarget, run_client};
