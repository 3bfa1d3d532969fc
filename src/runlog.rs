//! Append-only, timestamped audit trail for a single run.
//!
//! The run log is the operational record handed back to the caller: one line
//! per attempt, wait, success, and failure, in the order they happened. It is
//! passed by `&mut` into each stage rather than held in global state.
//!
//! Every entry is mirrored to `tracing` as it is recorded.

use chrono::{DateTime, Local};
use std::fmt;

/// Severity of a run log entry. Only affects how the entry is mirrored to
/// `tracing`; the rendered log text is the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

/// A single timestamped line in the run log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.message
        )
    }
}

/// Ordered collection of [`LogEntry`] values.
///
/// Entries can only be appended, either one at a time or by merging the
/// fragment produced by an independent task with [`RunLog::append`].
#[derive(Debug, Default, Clone)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a progress line.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    /// Record a failure line.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, message.into());
    }

    fn push(&mut self, level: Level, message: String) {
        match level {
            Level::Info => tracing::info!(target: "allnews::run", "{message}"),
            Level::Warn => tracing::warn!(target: "allnews::run", "{message}"),
        }
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            level,
            message,
        });
    }

    /// Move every entry of `fragment` onto the end of this log, keeping
    /// their original timestamps and order.
    pub fn append(&mut self, mut fragment: RunLog) {
        self.entries.append(&mut fragment.entries);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages without timestamps, mostly useful for assertions.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    /// Number of entries whose message contains `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.messages().filter(|m| m.contains(needle)).count()
    }

    /// The whole log as newline-joined text.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
