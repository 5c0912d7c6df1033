//! The asynchronous logger and its consumer thread.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::record::{Level, LineFormat, LogRecord};
use super::sink::{FileSink, LogSink};
use super::LoggerState;
use crate::config::LoggerConfig;
use crate::queue::ConcurrentQueue;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// Default consumer poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What the consumer finds in the queue.
enum Entry {
    Record(LogRecord),
    /// Pushed by `stop` and `kill` behind every accepted record.
    Stop,
}

/// State shared with the consumer thread.
#[derive(Default)]
struct Shared {
    queue: ConcurrentQueue<Entry>,
    killed: AtomicBool,
    written: AtomicU64,
    dropped: AtomicU64,
    write_failures: AtomicU64,
    format_failures: AtomicU64,
}

/// Thread-safe logger that writes on a background thread.
///
/// Log calls build a [`LogRecord`] on the calling thread and push it onto an
/// internal [`ConcurrentQueue`]; a single consumer thread pops records and
/// writes them to the sink in the order they were enqueued. The caller never
/// waits for I/O.
///
/// # Shutdown
///
/// - [`stop`] (also run on drop) rejects new records, lets the consumer write
///   everything already queued, and joins it.
/// - [`kill`] makes the consumer exit on its next iteration; records still
///   queued are never written.
///
/// The consumer waits on the queue with [`ConcurrentQueue::try_pop_timed`] so
/// that it re-checks the kill flag at least once per poll interval. Stop and
/// kill also push a sentinel entry, which wakes an idle consumer at once; the
/// poll interval only bounds the latency of a kill while records are queued
/// behind a slow sink.
///
/// # Example
///
/// ```no_run
/// use taskline::logger::{AsyncLogger, Level};
///
/// let logger = AsyncLogger::new("app.log")?;
/// logger.info("service started");
/// logger.log(Level::Warning, format_args!("{} retries left", 2), Some("connect"));
/// logger.stop();
/// # Ok::<(), std::io::Error>(())
/// ```
///
/// [`stop`]: AsyncLogger::stop
/// [`kill`]: AsyncLogger::kill
pub struct AsyncLogger {
    shared: Arc<Shared>,
    /// Log calls hold the read side while enqueueing; stop and kill take the
    /// write side, so no record can land behind the sentinel.
    state: RwLock<LoggerState>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncLogger {
    /// Log to `path` with the default poll interval and text lines.
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        Self::builder(path).build()
    }

    /// Start configuring a logger that writes to `path`.
    pub fn builder(path: impl Into<PathBuf>) -> AsyncLoggerBuilder {
        AsyncLoggerBuilder::new(path)
    }

    /// Create a logger from loaded configuration.
    pub fn from_config(config: &LoggerConfig) -> io::Result<Self> {
        Self::builder(config.file.clone())
            .poll_interval(config.poll_interval)
            .format(config.format)
            .truncate(config.truncate)
            .build()
    }

    /// Log to a custom sink.
    pub fn with_sink<S: LogSink>(
        sink: S,
        format: LineFormat,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let consumer_shared = Arc::clone(&shared);

        let consumer = thread::Builder::new()
            .name("taskline-logger".into())
            .spawn(move || consume(&consumer_shared, sink, format, poll_interval))?;

        Ok(Self {
            shared,
            state: RwLock::new(LoggerState::Active),
            consumer: Mutex::new(Some(consumer)),
        })
    }

    /// Queue a record. Dropped (and counted) unless the logger is active.
    ///
    /// `function` names the calling function, see [`log_fn!`](crate::log_fn).
    /// A message whose `Display` impl fails or panics is replaced by a
    /// placeholder ERROR record.
    pub fn log(&self, level: Level, message: impl fmt::Display, function: Option<&str>) {
        if self.state() != LoggerState::Active {
            self.reject();
            return;
        }

        // The message may log through this logger, so format it outside the
        // state guard.
        let record = LogRecord::format(level, message, function).unwrap_or_else(|placeholder| {
            self.shared.format_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(level = %level, "log message could not be formatted");
            placeholder
        });

        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if *state != LoggerState::Active {
            drop(state);
            self.reject();
            return;
        }
        self.shared.queue.push(Entry::Record(record));
    }

    fn reject(&self) {
        self.shared.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("log call after stop dropped");
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message, None);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message, None);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warning, message, None);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message, None);
    }

    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(Level::Fatal, message, None);
    }

    /// Stop accepting records, write everything queued, and join the
    /// consumer. Idempotent.
    pub fn stop(&self) {
        self.request_stop(false);
        self.join_consumer();
    }

    /// Stop the consumer as soon as possible, abandoning queued records.
    ///
    /// Does not wait for the consumer; [`stop`](AsyncLogger::stop) or drop
    /// joins it.
    pub fn kill(&self) {
        self.request_stop(true);
    }

    fn request_stop(&self, kill: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if kill {
            self.shared.killed.store(true, Ordering::Release);
        }
        if *state == LoggerState::Active {
            *state = LoggerState::Draining;
            self.shared.queue.push(Entry::Stop);
            tracing::debug!(kill, pending = self.shared.queue.len(), "logger stopping");
        }
    }

    fn join_consumer(&self) {
        let mut consumer = self.consumer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = consumer.take() {
            if handle.join().is_err() {
                tracing::error!("logger consumer thread panicked");
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = LoggerState::Stopped;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoggerState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records written to the sink.
    pub fn written(&self) -> u64 {
        self.shared.written.load(Ordering::Relaxed)
    }

    /// Log calls rejected because the logger was no longer active.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Records lost to sink errors.
    pub fn write_failures(&self) -> u64 {
        self.shared.write_failures.load(Ordering::Relaxed)
    }

    /// Messages replaced by a placeholder because formatting failed.
    pub fn format_failures(&self) -> u64 {
        self.shared.format_failures.load(Ordering::Relaxed)
    }

    /// Records queued but not yet written.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for AsyncLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLogger")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .field("written", &self.written())
            .finish()
    }
}

/// Consumer thread main loop.
fn consume<S: LogSink>(shared: &Shared, mut sink: S, format: LineFormat, poll_interval: Duration) {
    loop {
        if shared.killed.load(Ordering::Acquire) {
            break;
        }

        let Some(entry) = shared.queue.try_pop_timed(poll_interval) else {
            continue;
        };

        let record = match entry {
            Entry::Record(record) => record,
            Entry::Stop => break,
        };

        match sink.write_line(&record.render(format)) {
            Ok(()) => {
                shared.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                shared.write_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "failed to write log record");
            }
        }
    }

    if let Err(e) = sink.flush() {
        tracing::warn!(error = %e, "failed to flush log sink");
    }
}

/// Builder for [`AsyncLogger`].
#[derive(Debug)]
pub struct AsyncLoggerBuilder {
    path: PathBuf,
    poll_interval: Duration,
    format: LineFormat,
    truncate: bool,
}

impl AsyncLoggerBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            format: LineFormat::default(),
            truncate: false,
        }
    }

    /// How long the consumer waits on an empty queue before re-checking
    /// the kill flag. Zero is raised to one millisecond.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Line layout written to the file.
    pub fn format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    /// Discard the file's previous contents when the logger starts.
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Open the sink and start the consumer thread.
    pub fn build(self) -> io::Result<AsyncLogger> {
        let sink = if self.truncate {
            FileSink::truncated(self.path)?
        } else {
            FileSink::new(self.path)
        };
        AsyncLogger::with_sink(sink, self.format, self.poll_interval)
    }
}

impl Default for AsyncLoggerBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}
