//! Utilities shared by the embers server and client binaries.

pub mod logger;
pub mod time;
