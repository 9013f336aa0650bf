//! # Logging
//!
//! Installs a `tracing` subscriber. actix's `Logger` middleware writes through
//! the `log` facade, which the subscriber picks up.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber with the given filter.
///
/// Falls back to `info` on an unparsable filter. Calling it again is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .try_init();
}
