//! Log records and their line formats.

use std::fmt::{self, Write as _};
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Timestamp layout of text lines, e.g. `2024-12-28 15:04:05.123`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Placeholder message used when a payload cannot be formatted.
pub(crate) const FORMAT_FAILURE_MESSAGE: &str = "LOGGING ERROR: message could not be formatted";

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Debug,
    Warning,
    Error,
    Fatal,
}

impl Level {
    /// Upper-case name as written to the sink.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INFO" => Ok(Level::Info),
            "DEBUG" => Ok(Level::Debug),
            "WARN" | "WARNING" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Layout of each line written to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineFormat {
    /// `<timestamp> <LEVEL>: [<function>: ]<message>`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LineFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(LineFormat::Text),
            "json" => Ok(LineFormat::Json),
            other => Err(format!("unknown line format: {}", other)),
        }
    }
}

/// One log call, captured on the calling thread.
///
/// The timestamp is taken when the record is built, not when it is written,
/// so timestamps follow call order even when the sink lags behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    #[serde(rename = "ts")]
    timestamp: DateTime<Local>,
    level: Level,
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<String>,
    #[serde(rename = "msg")]
    message: String,
}

impl LogRecord {
    /// Build a record stamped with the current local time.
    pub fn new(level: Level, message: impl Into<String>, function: Option<&str>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            function: function.filter(|name| !name.is_empty()).map(str::to_owned),
            message: message.into(),
        }
    }

    /// Format `message` and build a record from it.
    ///
    /// A `Display` impl that reports an error or panics yields `Err` with a
    /// placeholder ERROR record in its place, keeping the original function
    /// name. The panic does not reach the caller.
    pub fn format(
        level: Level,
        message: impl fmt::Display,
        function: Option<&str>,
    ) -> Result<Self, Self> {
        let mut text = String::new();
        let written = panic::catch_unwind(AssertUnwindSafe(|| write!(text, "{}", message)));
        match written {
            Ok(Ok(())) => Ok(Self::new(level, text, function)),
            Ok(Err(fmt::Error)) | Err(_) => {
                Err(Self::new(Level::Error, FORMAT_FAILURE_MESSAGE, function))
            }
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the record as a single line, without the trailing newline.
    pub fn render(&self, format: LineFormat) -> String {
        match format {
            LineFormat::Text => self.to_string(),
            LineFormat::Json => {
                serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
            }
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: ",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level
        )?;
        if let Some(function) = &self.function {
            write!(f, "{}: ", function)?;
        }
        f.write_str(&self.message)
    }
}
