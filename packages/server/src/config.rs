//! Server configuration.

use std::time::Duration;

/// Runtime settings shared by the use cases and the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum number of distinct identities per room
    pub capacity: usize,
    /// Initial lifetime of a new room
    pub room_ttl: Duration,
    /// How often expired keys and idle channels are reclaimed
    pub sweep_interval: Duration,
    /// Mark identity cookies `Secure` (enable behind TLS)
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            capacity: 2,
            room_ttl: Duration::from_secs(86_400),
            sweep_interval: Duration::from_secs(30),
            secure_cookies: false,
        }
    }
}
