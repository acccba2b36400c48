//! Log record data model.
//!
//! Defines the core `LogRecord` structure buffered and exported by the
//! pipeline, and the ordered `Severity` scale attached to every record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Log severity level.
///
/// Levels are ordered: `Debug < Info < Warn < Error`. The pipeline uses this
/// ordering for its minimum-severity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Debug information.
    Debug,
    /// Informational messages.
    Info,
    /// Warning conditions.
    Warn,
    /// Error conditions.
    Error,
}

impl Severity {
    /// Returns the numeric severity used on the wire.
    ///
    /// The values follow the OpenTelemetry log data model, where each named
    /// level starts a range of four (DEBUG=5, INFO=9, WARN=13, ERROR=17).
    #[must_use]
    pub fn severity_number(self) -> u32 {
        match self {
            Self::Debug => 5,
            Self::Info => 9,
            Self::Warn => 13,
            Self::Error => 17,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

/// A structured log event.
///
/// Records are created by application code through a [`Logger`] handle,
/// buffered in a batch processor, and exported to the collector. Emitting a
/// record never blocks the caller.
///
/// [`Logger`]: crate::provider::Logger
///
/// # Example
///
/// ```
/// use telemetry::models::{LogRecord, Severity};
///
/// let record = LogRecord::new(Severity::Info, "User logged in")
///     .with_attribute("user_id", "12345");
///
/// assert_eq!(record.severity, Severity::Info);
/// assert_eq!(record.body, "User logged in");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp when the log event occurred.
    pub timestamp: DateTime<Utc>,

    /// Severity level of the record.
    #[serde(default)]
    pub severity: Severity,

    /// The log message content.
    pub body: String,

    /// Additional key-value attributes.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    /// Name of the scope that emitted the record.
    ///
    /// Set by the emitting [`Logger`](crate::provider::Logger) handle.
    #[serde(default)]
    pub scope: String,
}

impl LogRecord {
    /// Creates a new log record with the current timestamp.
    #[must_use]
    pub fn new(severity: Severity, body: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            body: body.into(),
            attributes: HashMap::new(),
            scope: String::new(),
        }
    }

    /// Sets an explicit timestamp on the record.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Adds an attribute to the record.
    ///
    /// Values that fail to serialize are stored as JSON null.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.attributes.insert(
            key.into(),
            serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_severity_numbers() {
        assert_eq!(Severity::Debug.severity_number(), 5);
        assert_eq!(Severity::Info.severity_number(), 9);
        assert_eq!(Severity::Warn.severity_number(), 13);
        assert_eq!(Severity::Error.severity_number(), 17);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Debug.to_string(), "debug");
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warn.to_string(), "warn");
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&Severity::Error).unwrap(),
            "\"error\""
        );
        let severity: Severity = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(severity, Severity::Debug);
    }

    #[test]
    fn test_log_record_new() {
        let record = LogRecord::new(Severity::Warn, "High memory usage");

        assert_eq!(record.severity, Severity::Warn);
        assert_eq!(record.body, "High memory usage");
        assert!(record.attributes.is_empty());
        assert!(record.scope.is_empty());
    }

    #[test]
    fn test_log_record_with_attributes() {
        let record = LogRecord::new(Severity::Info, "Request processed")
            .with_attribute("request_id", "abc-123")
            .with_attribute("duration_ms", 150)
            .with_attribute("cached", true);

        assert_eq!(record.attributes.len(), 3);
        assert_eq!(record.attributes.get("request_id"), Some(&json!("abc-123")));
        assert_eq!(record.attributes.get("duration_ms"), Some(&json!(150)));
        assert_eq!(record.attributes.get("cached"), Some(&json!(true)));
    }

    #[test]
    fn test_log_record_serialization_roundtrip() {
        let original = LogRecord::new(Severity::Error, "Something failed")
            .with_attribute("error_code", "E001");

        let json = serde_json::to_string(&original).unwrap();
        let deserialized: LogRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(original.severity, deserialized.severity);
        assert_eq!(original.body, deserialized.body);
        assert_eq!(original.attributes, deserialized.attributes);
    }
}
