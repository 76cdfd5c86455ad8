//! Log subscriber setup for binaries and test harnesses embedding the engine.
//!
//! The library itself only emits `tracing` events. Callers that want them
//! printed install a subscriber once, from [`LoggingConfig`].

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::CoreError;

/// Install a global `fmt` subscriber filtered by `config.level`.
///
/// # Errors
///
/// Returns [`CoreError::Telemetry`] if the level is not a valid filter
/// directive or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), CoreError> {
    let filter =
        EnvFilter::try_new(&config.level).map_err(|err| CoreError::Telemetry(err.to_string()))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| CoreError::Telemetry(err.to_string()))
}
