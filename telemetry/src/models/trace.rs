//! Span data models.
//!
//! Defines the exported form of a finished span. Live spans are created
//! through a [`Tracer`](crate::provider::Tracer) handle and become a
//! [`SpanData`] when ended; a span that is never ended is not exported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of a span, used for parenting.
///
/// Identifiers are lowercase hex strings: 16 bytes for the trace, 8 bytes
/// for the span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanContext {
    /// Identifier of the trace this span belongs to.
    pub trace_id: String,
    /// Identifier of this span.
    pub span_id: String,
}

/// An event recorded within a span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanEvent {
    /// The name of the event.
    pub name: String,
    /// Timestamp when the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Additional attributes for the event.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl SpanEvent {
    /// Creates a new event with the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now(),
            attributes: HashMap::new(),
        }
    }
}

/// A finished span, ready for export.
///
/// Invariant: `end_time >= start_time`. The [`Span`](crate::provider::Span)
/// handle enforces this by stamping `end_time` when `end()` is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanData {
    /// Identifier of the trace this span belongs to.
    pub trace_id: String,

    /// Identifier of this span.
    pub span_id: String,

    /// The parent span identifier (None for root spans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    /// The name/operation of this span.
    pub name: String,

    /// Name of the scope that created the span.
    #[serde(default)]
    pub scope: String,

    /// Timestamp when the span started.
    pub start_time: DateTime<Utc>,

    /// Timestamp when the span ended.
    pub end_time: DateTime<Utc>,

    /// Key-value attributes attached to the span.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    /// Timestamped events recorded during the span, in order.
    #[serde(default)]
    pub events: Vec<SpanEvent>,
}

impl SpanData {
    /// Returns the identity of this span.
    #[must_use]
    pub fn context(&self) -> SpanContext {
        SpanContext {
            trace_id: self.trace_id.clone(),
            span_id: self.span_id.clone(),
        }
    }

    /// Returns the duration of the span.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}
