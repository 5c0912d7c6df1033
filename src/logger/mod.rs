//! Asynchronous file logger.
//!
//! ```text
//!  app threads ── log() ──▶ ConcurrentQueue<Entry> ──▶ consumer thread ──▶ LogSink
//!   (timestamp taken here)      (FIFO, unbounded)        (try_pop_timed)     (file)
//! ```
//!
//! Lines look like `2024-12-28 15:04:05.123 WARNING: connect: 2 retries left`,
//! or one JSON object per line with [`LineFormat::Json`].

mod record;
mod sink;
mod writer;

pub use record::{Level, LineFormat, LogRecord};
pub use sink::{FileSink, LogSink};
pub use writer::{AsyncLogger, AsyncLoggerBuilder, DEFAULT_LOG_FILE, DEFAULT_POLL_INTERVAL};

use std::fmt;

/// Lifecycle of an [`AsyncLogger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    /// Accepting records.
    Active,
    /// Rejecting records; the consumer is writing what is left (or has been
    /// killed and is about to exit).
    Draining,
    /// The consumer thread has exited. Terminal.
    Stopped,
}

impl fmt::Display for LoggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoggerState::Active => "active",
            LoggerState::Draining => "draining",
            LoggerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Expands to the path of the enclosing function, e.g. `my_crate::worker::run`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// Log through an [`AsyncLogger`] with the calling function's name attached.
///
/// ```no_run
/// use taskline::log_fn;
/// use taskline::logger::{AsyncLogger, Level};
///
/// fn connect(logger: &AsyncLogger, retries: u32) {
///     log_fn!(logger, Level::Warning, "{} retries left", retries);
/// }
/// ```
#[macro_export]
macro_rules! log_fn {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format_args!($($arg)+), Some($crate::function_name!()))
    };
}
