//! Tracing subscriber setup for the `credvault` binary.
//!
//! The library only emits events; installing a subscriber is left to the
//! binary so embedding applications keep control of their own output.

use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise `credvault=<level>,warn`.
pub fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credvault={log_level},warn")))
}

/// Install the global subscriber, writing to stderr.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(log_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(log_level))
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}
