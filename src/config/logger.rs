//! Async logger configuration.

use std::path::PathBuf;
use std::time::Duration;

use super::parse::{env_bool, env_duration, env_or};
use super::ConfigError;
use crate::logger::{LineFormat, DEFAULT_LOG_FILE, DEFAULT_POLL_INTERVAL};

/// Configuration of the [`AsyncLogger`](crate::logger::AsyncLogger) sink.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Log file path (LOG_FILE).
    pub file: PathBuf,
    /// Consumer poll interval (LOG_POLL_INTERVAL, e.g. "10ms").
    pub poll_interval: Duration,
    /// Line layout (LOG_FORMAT: text | json).
    pub format: LineFormat,
    /// Truncate the file at startup (LOG_TRUNCATE).
    pub truncate: bool,
}

impl LoggerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_interval = env_duration("LOG_POLL_INTERVAL", "10ms")?.ok_or_else(|| {
            ConfigError::Invalid {
                key: "LOG_POLL_INTERVAL".into(),
                message: "poll interval cannot be off".into(),
            }
        })?;

        let raw_format = env_or("LOG_FORMAT", "text");
        let format = raw_format
            .parse::<LineFormat>()
            .map_err(|message| ConfigError::Invalid {
                key: "LOG_FORMAT".into(),
                message,
            })?;

        Ok(Self {
            file: PathBuf::from(env_or("LOG_FILE", DEFAULT_LOG_FILE)),
            poll_interval,
            format,
            truncate: env_bool("LOG_TRUNCATE", false),
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            poll_interval: DEFAULT_POLL_INTERVAL,
            format: LineFormat::Text,
            truncate: false,
        }
    }
}
