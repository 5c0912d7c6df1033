//! Fixed-size worker pool.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      ThreadPool                            │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐                 │
//! │  │ Worker0 │    │ Worker1 │    │ Worker2 │  ...            │
//! │  └────┬────┘    └────┬────┘    └────┬────┘                 │
//! │       └──────────────┴──────────────┘                      │
//! │                      │ pop_blocking                        │
//! │          ┌───────────▼───────────┐                         │
//! │          │ ConcurrentQueue<Msg>  │  (unbounded FIFO)       │
//! │          └───────────▲───────────┘                         │
//! │                      │ push                                │
//! │              ┌───────┴───────┐                             │
//! │              │   submit()    │ ──▶ TaskHandle<R>           │
//! │              └───────────────┘                             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shutdown pushes one terminate message per worker. Because the queue is
//! FIFO, each worker sees its terminate message only after every job accepted
//! before the shutdown, so queued work is always drained, never cancelled.

mod error;
mod handle;
mod thread;

pub use error::{PoolError, PoolResult};
pub use handle::TaskHandle;
pub use thread::ThreadPool;

use std::fmt;

use serde::Serialize;

/// Lifecycle of a [`ThreadPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolState {
    /// Accepting and executing work.
    Running,
    /// Rejecting new work, draining what is queued.
    Stopping,
    /// All workers have exited. Terminal.
    Stopped,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::Running => "running",
            PoolState::Stopping => "stopping",
            PoolState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Statistics about pool activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Tasks accepted by `submit`.
    pub submitted: u64,
    /// Tasks that returned normally.
    pub completed: u64,
    /// Tasks that panicked.
    pub panicked: u64,
    /// Tasks accepted but not yet picked up by a worker.
    pub pending: usize,
    /// Average queue wait time in microseconds.
    pub avg_queue_wait_us: u64,
    /// Average execution time in microseconds.
    pub avg_exec_time_us: u64,
}
