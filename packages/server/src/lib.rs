//! Self-destructing chat room server library.
//!
//! Rooms live for a bounded time, admit at most a fixed number of distinct
//! identities, and are erased on expiry or explicit destruction. New messages
//! and destroy notifications fan out to every connected viewer.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
