//! Worker pool configuration.

use std::num::NonZeroUsize;

use super::parse::{env_or, env_parse};
use super::ConfigError;

/// Worker pool configuration loaded from environment.
///
/// The worker count is resolved once at load time.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Pool name, used for thread names and log fields.
    pub name: String,
    /// Resolved worker count (never zero).
    worker_count: NonZeroUsize,
}

impl PoolConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let workers: usize = env_parse("WORKERS", 0)?;
        Self::new(workers, env_or("POOL_NAME", "taskline"))
    }

    /// Build a configuration directly; `workers == 0` resolves to the CPU count.
    pub fn new(workers: usize, name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "POOL_NAME".into(),
                message: "pool name cannot be empty".into(),
            });
        }

        let count = if workers == 0 { num_cpus::get() } else { workers };
        let worker_count = NonZeroUsize::new(count).ok_or_else(|| ConfigError::Invalid {
            key: "WORKERS".into(),
            message: "worker count cannot be zero".into(),
        })?;

        Ok(Self { name, worker_count })
    }

    /// Get worker count (pre-computed).
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count.get()
    }
}
