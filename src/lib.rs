//! taskline - thread-safe queue, worker pool, and asynchronous logger.
//!
//! # Components
//!
//! - [`ConcurrentQueue`] - unbounded FIFO shared between any number of
//!   producer and consumer threads, with blocking, non-blocking, and timed pops
//! - [`ThreadPool`] - fixed set of worker threads draining a shared queue of
//!   closures; every submission yields a [`TaskHandle`]
//! - [`AsyncLogger`] - single background thread writing queued records to a
//!   file in call order
//!
//! # Example
//!
//! ```rust,no_run
//! use taskline::{AsyncLogger, ThreadPool};
//!
//! let logger = std::sync::Arc::new(AsyncLogger::new("app.log")?);
//! let pool = ThreadPool::new(4, "crunch")?;
//!
//! let log = logger.clone();
//! let handle = pool.submit(move || {
//!     log.info("computing");
//!     6 * 7
//! })?;
//!
//! assert_eq!(handle.get()?, 42);
//! pool.shutdown();
//! logger.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty when built outside a git checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

pub mod config;
pub mod logger;
pub mod logging;
pub mod pool;
pub mod queue;

// Re-exports for convenience
pub use config::Config;
pub use logger::{AsyncLogger, Level};
pub use pool::{PoolError, TaskHandle, ThreadPool};
pub use queue::ConcurrentQueue;

/// Full version string: "0.1.0 (abc12345)", or just "0.1.0" without a hash.
pub fn version() -> String {
    if BUILD_VERSION.is_empty() {
        PKG_VERSION.to_string()
    } else {
        format!("{} ({})", PKG_VERSION, BUILD_VERSION)
    }
}
