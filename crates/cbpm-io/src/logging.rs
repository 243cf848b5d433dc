//! Tracing setup.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages from every crate
//! - `RUST_LOG=cbpm=trace` - Trace for the CBPM crates only
//! - Default: INFO, DEBUG for the CBPM crates

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info,cbpm=debug";

/// Installs the global `fmt` subscriber, writing to stderr.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
