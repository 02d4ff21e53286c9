//! Structured logging setup for hosts embedding the service.
//!
//! Thin wrapper over `tracing-subscriber`: `RUST_LOG` wins when set,
//! otherwise the configured level from [`LoggingSection`] applies.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSection;

/// Initialize the global tracing subscriber.
///
/// Call once at host startup, before constructing the engine. Calling it
/// twice is a no-op (the second subscriber fails to install and is
/// discarded) rather than a panic, so embedding hosts that already set up
/// tracing are unaffected.
pub fn init_logging(config: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
