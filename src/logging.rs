//! Logging setup
//!
//! enki emits `tracing` events; with no subscriber installed they are
//! discarded. Callers that want output install the fmt subscriber here.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::LoggingError;

/// Default level for a verbosity count (`-v` repeats)
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter combining `RUST_LOG` with the verbosity default
pub fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level_for(verbosity).into())
}

/// Install the global fmt subscriber writing to stderr
///
/// Fails if a global subscriber is already set.
pub fn init(verbosity: u8) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
