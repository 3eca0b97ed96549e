//! Logging initialization for cookflow.
//!
//! Logs go to stderr so stdout stays free for step and notice output.

use crate::config::LoggingConfig;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when no `--debug` flag or `RUST_LOG` is given.
pub fn effective_level(config: &LoggingConfig, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.level.clone()
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already set.
pub fn init_logging(config: &LoggingConfig, debug_override: bool) -> Result<(), TryInitError> {
    let level = effective_level(config, debug_override);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
}
