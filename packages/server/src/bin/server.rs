//! Self-destructing chat room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin embers-server
//! cargo run --bin embers-server -- --host 0.0.0.0 --port 3000 --room-ttl-secs 600
//! ```

use std::time::Duration;

use clap::Parser;
use embers_server::{config::ServerConfig, ui::Server};
use embers_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "embers-server")]
#[command(about = "Self-destructing two-party chat room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Maximum number of distinct participants per room
    #[arg(long, default_value = "2")]
    capacity: usize,

    /// Initial lifetime of a new room, in seconds
    #[arg(long, default_value = "86400")]
    room_ttl_secs: u64,

    /// Interval between expiry sweeps, in seconds
    #[arg(long, default_value = "30")]
    sweep_interval_secs: u64,

    /// Mark identity cookies as Secure (serve behind TLS)
    #[arg(long)]
    secure_cookies: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            capacity: args.capacity.max(1),
            room_ttl: Duration::from_secs(args.room_ttl_secs),
            sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
            secure_cookies: args.secure_cookies,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        &["embers_server", env!("CARGO_BIN_NAME"), "tower_http"],
        &args.log_level,
    );

    let server = Server::in_memory(args.into());
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
