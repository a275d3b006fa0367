//! Tracing/logging setup shared by binaries and integration tests.

/// Tracing configuration (filters, formatters).
pub mod tracing;

/// Initialize process-wide JSON logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide human-readable logging (local runs, tests).
pub fn init_pretty() {
    tracing::init_pretty();
}
