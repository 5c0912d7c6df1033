//! Destinations for rendered log lines.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where the logger's consumer thread writes lines.
///
/// A sink is owned by the consumer thread, so implementations need no
/// internal locking. Errors are reported back to the consumer, which counts
/// them and carries on with the next record.
pub trait LogSink: Send + 'static {
    /// Write one line. `line` carries no trailing newline.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered output. Called once when the consumer exits.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Append-only text file sink.
///
/// The file is opened lazily in append mode. After a failed write the handle
/// is discarded and the next line reopens the file, so a log file that is
/// deleted or rotated underneath the logger recovers on its own. Each line is
/// flushed as it is written to keep the file complete if the process dies.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    /// Create a sink that appends to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// Create a sink after truncating `path`, discarding earlier contents.
    ///
    /// Writes still go through an append handle.
    pub fn truncated(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        file.set_len(0)?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    fn file(&mut self) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => open_append(&self.path)?,
        };
        Ok(self.file.insert(file))
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl LogSink for FileSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let result = self.file().and_then(|file| {
            let mut buf = Vec::with_capacity(line.len() + 1);
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
            file.write_all(&buf)?;
            file.flush()
        });

        if result.is_err() {
            self.file = None;
        }
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file {
            Some(ref mut file) => file.flush(),
            None => Ok(()),
        }
    }
}
