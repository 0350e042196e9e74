use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Number of entries the activity log retains; the oldest is evicted first.
pub const LOG_CAPACITY: usize = 200;

/// Severity of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// One timestamped line of the activity log. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub severity: Severity,
}

/// Append-only, capacity-bounded log backing the console panel.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    /// Records a message with the current wall-clock time. Always succeeds.
    pub fn append(&mut self, message: impl Into<String>, severity: Severity) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: Local::now(),
            message: message.into(),
            severity,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.append(message, Severity::Info);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.append(message, Severity::Warn);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.append(message, Severity::Error);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
