//! Self-destructing chat room client.
//!
//! Creates or joins a room, then sends each typed line as a message.
//! The display name is generated once and reused across runs.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin embers-client -- create
//! cargo run --bin embers-client -- join <ROOM_ID>
//! cargo run --bin embers-client -- --url http://127.0.0.1:3000 join <ROOM_ID>
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use embers_client::{RoomTarget, run_client};
use embers_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "embers-client")]
#[command(about = "Client for self-destructing two-party chat rooms", long_about = None)]
struct Args {
    /// Server URL
    #[arg(short = 'u', long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// File holding the persisted display name (default: ~/.embers/username)
    #[arg(long)]
    username_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new room and enter it
    Create,
    /// Join an existing room
    Join {
        /// Room id shared by the room's creator
        room_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&["embers_client", env!("CARGO_BIN_NAME")], "info");

    let args = Args::parse();
    let target = match args.command {
        Command::Create => RoomTarget::Create,
        Command::Join { room_id } => RoomTarget::Join(room_id),
    };

    // Run the client
    if let Err(e) = run_client(args.url, args.username_file, target).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
