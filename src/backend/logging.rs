//! Tracing initialization for the binaries.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, filtered by `RUST_LOG` (or `default_filter`)
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
