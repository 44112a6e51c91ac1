//! Logging setup utilities for the embers binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Every crate target listed in `targets` (e.g. `embers_server`, the binary
/// name) gets `default_log_level`. The filter can be overridden entirely with
/// the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use embers_shared::logger::setup_logger;
///
/// setup_logger(&["embers_server", "embers_server_bin"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(targets: &[&str], level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), level))
        .collect::<Vec<_>>()
        .join(",")
}
