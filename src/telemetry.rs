//! Tracing setup and the tracing-backed observability sink.

use crate::config::{LogFormat, LoggingConfig};
use fmp_client::sink::{Event, Level, ObservabilitySink};
use serde_json::Value;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
/// Returns error if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::PlainText => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Structured => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false),
            )
            .try_init(),
    }
}

/// Sink forwarding events to `tracing` under the `stock_analytics` target.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    format: LogFormat,
}

impl TracingSink {
    /// Creates a sink rendering for the given format.
    #[must_use]
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    /// The format chosen at construction.
    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format
    }
}

macro_rules! emit_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::Debug => tracing::debug!(target: "stock_analytics", $($arg)+),
            Level::Info => tracing::info!(target: "stock_analytics", $($arg)+),
            Level::Warn => tracing::warn!(target: "stock_analytics", $($arg)+),
            Level::Error => tracing::error!(target: "stock_analytics", $($arg)+),
        }
    };
}

impl ObservabilitySink for TracingSink {
    fn emit(&self, event: Event) {
        match self.format {
            LogFormat::PlainText => {
                let line = render_plain(&event);
                emit_at!(event.level, "{}", line);
            }
            LogFormat::Structured => {
                let fields = serde_json::to_string(&event.fields).unwrap_or_default();
                emit_at!(
                    event.level,
                    event = event.name,
                    fields = %fields,
                    "{}",
                    event.message
                );
            }
        }
    }
}

/// Renders `message - key=value ...` for plain text output.
#[must_use]
pub fn render_plain(event: &Event) -> String {
    if event.fields.is_empty() {
        return event.message.clone();
    }
    let fields: Vec<String> = event
        .fields
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect();
    format!("{} - {}", event.message, fields.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_without_fields() {
        let event = Event::info("app.startup", "ready");

        assert_eq!(render_plain(&event), "ready");
    }

    #[test]
    fn test_render_plain_with_fields_sorted() {
        let event = Event::info("fmp_api.call", "FMP API RESPONSE: profile")
            .field("status_code", 200)
            .field("endpoint", "profile");

        assert_eq!(
            render_plain(&event),
            "FMP API RESPONSE: profile - endpoint=profile status_code=200"
        );
    }

    #[test]
    fn test_tracing_sink_keeps_format() {
        let sink = TracingSink::new(LogFormat::Structured);
        assert_eq!(sink.format(), LogFormat::Structured);

        // no subscriber installed: events are dropped without panicking
        sink.emit(Event::error("x", "y").field("k", 1));
        TracingSink::new(LogFormat::PlainText).emit(Event::warn("x", "y"));
    }
}
