//! Tracing setup shared by binaries and long-running tasks

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber from `RUST_LOG`.
///
/// Safe to call once per process; subsequent calls are no-ops so tests can
/// call it unconditionally.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
