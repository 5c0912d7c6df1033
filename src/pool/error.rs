//! Worker pool error types.

use std::fmt;
use std::time::Duration;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool is stopping or stopped and accepts no more work.
    Stopped,

    /// The caller gave up waiting for a task result.
    Timeout(Duration),

    /// The task panicked while running. Carries the panic message.
    TaskPanicked(String),

    /// The task was discarded without ever running.
    Cancelled,

    /// A worker thread could not be spawned.
    Spawn(String),
}

impl PoolError {
    /// Check if this is a stopped-pool rejection.
    pub fn is_stopped(&self) -> bool {
        matches!(self, PoolError::Stopped)
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PoolError::Timeout(_))
    }

    /// Check if the task itself failed.
    pub fn is_task_failure(&self) -> bool {
        matches!(self, PoolError::TaskPanicked(_))
    }

    /// Check if the task never ran.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PoolError::Cancelled)
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::Stopped => "Pool stopped",
            PoolError::Timeout(_) => "Task timeout",
            PoolError::TaskPanicked(msg) => msg,
            PoolError::Cancelled => "Task cancelled",
            PoolError::Spawn(_) => "Worker spawn failed",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Stopped => write!(f, "pool has been stopped"),
            PoolError::Timeout(duration) => {
                write!(f, "task timeout after {}ms", duration.as_millis())
            }
            PoolError::TaskPanicked(msg) => write!(f, "task panicked: {}", msg),
            PoolError::Cancelled => write!(f, "task was cancelled before it ran"),
            PoolError::Spawn(msg) => write!(f, "failed to spawn worker: {}", msg),
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
