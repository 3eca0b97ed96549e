//! Service configuration.
//!
//! Configuration is a TOML document; every section and field is optional and
//! falls back to its default.
//!
//! ```toml
//! [scheduler]
//! max_outstanding_timers = 1024
//! time_scale = 1.0
//!
//! [notifier]
//! buffer = 256
//!
//! [logging]
//! level = "info"
//! ```

pub mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Upper bound on armed timers across all sessions (default: 1024)
    #[serde(default = "default_max_outstanding_timers")]
    pub max_outstanding_timers: usize,
    /// Wall-clock seconds per parsed second; 1/60 turns minutes into seconds
    /// for demos (default: 1.0)
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_outstanding_timers: default_max_outstanding_timers(),
            time_scale: default_time_scale(),
        }
    }
}

fn default_max_outstanding_timers() -> usize {
    1024
}

fn default_time_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Notices buffered per channel before new ones are dropped (default: 256)
    #[serde(default = "default_notifier_buffer")]
    pub buffer: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            buffer: default_notifier_buffer(),
        }
    }
}

fn default_notifier_buffer() -> usize {
    256
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or return defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timers = self.scheduler.max_outstanding_timers;
        if timers == 0 || timers > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid {
                field: "scheduler.max_outstanding_timers",
                reason: format!(
                    "must be between 1 and {}, got {timers}",
                    tokio::sync::Semaphore::MAX_PERMITS
                ),
            });
        }
        if !self.scheduler.time_scale.is_finite() || self.scheduler.time_scale <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "scheduler.time_scale",
                reason: format!("must be positive, got {}", self.scheduler.time_scale),
            });
        }
        if self.notifier.buffer == 0 {
            return Err(ConfigError::Invalid {
                field: "notifier.buffer",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
