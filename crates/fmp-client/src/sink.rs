//! Observability sink interface.
//!
//! The client and the HTTP layer report structured events to a sink handed
//! to them at construction. Rendering, routing and retention of those events
//! belong to the sink implementation.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Degraded but handled.
    Warn,
    /// Failed operation.
    Error,
}

/// A structured event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Dotted event name, e.g. `fmp_api.call`.
    pub name: &'static str,
    /// Severity.
    pub level: Level,
    /// Human readable message.
    pub message: String,
    /// Machine readable fields.
    pub fields: BTreeMap<String, Value>,
}

impl Event {
    /// Creates an event without fields.
    #[must_use]
    pub fn new(name: &'static str, level: Level, message: impl Into<String>) -> Self {
        Self {
            name,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Creates an INFO event.
    #[must_use]
    pub fn info(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, Level::Info, message)
    }

    /// Creates a WARN event.
    #[must_use]
    pub fn warn(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, Level::Warn, message)
    }

    /// Creates an ERROR event.
    #[must_use]
    pub fn error(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, Level::Error, message)
    }

    /// Attaches a field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Receiver of structured events. Implementations must tolerate concurrent
/// writers.
pub trait ObservabilitySink: Send + Sync {
    /// Records one event.
    fn emit(&self, event: Event);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ObservabilitySink for NoopSink {
    fn emit(&self, _event: Event) {}
}

/// Append-only in-memory sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Returns the events with the given name.
    #[must_use]
    pub fn named(&self, name: &str) -> Vec<Event> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ObservabilitySink for MemorySink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}
