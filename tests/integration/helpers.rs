//! Test helpers and utilities

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskline::logger::LogSink;

/// Read a log file into its lines.
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Sink that records lines in memory after sleeping for `delay` per line.
#[derive(Clone, Default)]
pub struct SlowSink {
    pub lines: Arc<Mutex<Vec<String>>>,
    pub delay: Duration,
}

#[allow(dead_code)]
impl SlowSink {
    pub fn new(delay: Duration) -> Self {
        Self {
            lines: Arc::default(),
            delay,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for SlowSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        std::thread::sleep(self.delay);
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}
