//! Structured log sinks
//!
//! Components never reach for a global logger. They hold an
//! `Arc<dyn LogSink>` handed to them at construction and emit one event per
//! call: a severity, a stable event name, and key/value fields.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destination for structured log events.
pub trait LogSink: Send + Sync {
    /// Record one event with the given severity and fields
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]);

    fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }
}

/// Forwards events to the `tracing` dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn shared() -> Arc<dyn LogSink> {
        Arc::new(Self)
    }
}

impl LogSink for TracingSink {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let rendered = render_fields(fields);
        match severity {
            Severity::Trace => tracing::trace!(event = %event, fields = %rendered),
            Severity::Info => tracing::info!(event = %event, fields = %rendered),
            Severity::Warn => tracing::warn!(event = %event, fields = %rendered),
            Severity::Error => tracing::error!(event = %event, fields = %rendered),
        }
    }
}

/// Fields in deterministic (alphabetical) order as `key=value` pairs.
fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    sorted
        .iter()
        .map(|(k, v)| format!("{k}={v:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub severity: Severity,
    pub event: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `needle` appears anywhere in the event name or field values
    pub fn mentions(&self, needle: &str) -> bool {
        self.event.contains(needle) || self.fields.iter().any(|(_, v)| v.contains(needle))
    }
}

/// Captures events in memory (for tests)
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn contains_event(&self, event: &str) -> bool {
        self.records().iter().any(|r| r.event == event)
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let record = LogRecord {
            severity,
            event: event.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        // A poisoned lock only means another test thread panicked mid-push
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
