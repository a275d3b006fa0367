//! Tracing/logging initialization.
//!
//! The filter comes from `RUST_LOG`; without it, `info` is used, except for
//! the lookup and row-state chatter of the composer which stays at `warn`
//! unless asked for.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,lumberyard_production::store=warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// JSON logs + timestamps, configurable via RUST_LOG.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Compact human-readable logs written through the test writer, so output
/// is captured per test by the harness.
pub fn init_pretty() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .compact()
        .with_test_writer()
        .try_init();
}
