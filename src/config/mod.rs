//! Configuration module for taskline.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use taskline::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Workers: {}", config.pool.worker_count());
//! println!("Log file: {}", config.logger.file.display());
//! ```

mod error;
mod logger;
mod logging;
pub mod parse;
mod pool;

pub use error::ConfigError;
pub use logger::LoggerConfig;
pub use logging::{LoggingConfig, TraceFormat};
pub use pool::PoolConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Worker pool configuration.
    pub pool: PoolConfig,
    /// Async logger configuration.
    pub logger: LoggerConfig,
    /// Diagnostics configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pool: PoolConfig::from_env()?,
            logger: LoggerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Pool: {} ({} workers)", self.pool.name, self.pool.worker_count());
        info!("  Log file: {}", self.logger.file.display());
        info!(
            "  Log poll interval: {}ms",
            self.logger.poll_interval.as_millis()
        );
        info!("  Log format: {:?}", self.logger.format);

        if self.logger.truncate {
            info!("  Log truncate: enabled");
        }
    }
}
