//! Diagnostics (tracing) configuration.

use super::parse::{env_opt, env_or};
use super::ConfigError;

/// Output layout of the crate's own diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TraceFormat {
    /// Human-readable `tracing_subscriber::fmt` output.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Diagnostics configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Output layout (TRACE_FORMAT).
    pub format: TraceFormat,
    /// Service name for structured logging.
    pub service_name: String,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: taskline=debug
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_or("TRACE_FORMAT", "text").to_lowercase().as_str() {
            "text" => TraceFormat::Text,
            "json" => TraceFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    key: "TRACE_FORMAT".into(),
                    message: format!("expected text or json, got '{}'", other),
                })
            }
        };

        Ok(Self {
            filter: Self::resolve_log_filter(),
            format,
            service_name: env_or("SERVICE_NAME", "taskline"),
        })
    }

    /// Resolve log filter from environment.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter() -> String {
        if let Some(level) = env_opt("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("taskline={}", level);
                }
                _ => {
                    // No subscriber exists yet, so this goes straight to stderr.
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Some(filter) = env_opt("RUST_LOG") {
            return filter;
        }

        "taskline=info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "taskline=info".to_string(),
            format: TraceFormat::Text,
            service_name: "taskline".to_string(),
        }
    }
}
