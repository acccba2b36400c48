//! Export payload envelope.
//!
//! Serde types describing the body of one export request: the process's
//! resource attributes plus records or spans grouped by emitting scope.
//! Timestamps travel as unix-nanosecond strings and severities as
//! number + text, matching the collector's log/trace data model. The
//! payload schema itself is an external contract; this module only maps
//! the in-process models onto it.

use crate::models::{LogRecord, SpanData};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single key/value attribute on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValue {
    /// Attribute name.
    pub key: String,
    /// Attribute value.
    pub value: serde_json::Value,
}

/// Resource attributes block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePayload {
    /// Identity attributes of the emitting process.
    pub attributes: Vec<KeyValue>,
}

/// Scope identification block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopePayload {
    /// Name of the emitting scope.
    pub name: String,
}

/// One log record on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecordPayload {
    /// Event time as unix nanoseconds.
    pub time_unix_nano: String,
    /// Numeric severity.
    pub severity_number: u32,
    /// Severity name.
    pub severity_text: String,
    /// Record body.
    pub body: serde_json::Value,
    /// Record attributes.
    pub attributes: Vec<KeyValue>,
}

/// Log records emitted by one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeLogs {
    /// The emitting scope.
    pub scope: ScopePayload,
    /// Records in enqueue order.
    pub log_records: Vec<LogRecordPayload>,
}

/// Body of one log export request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogExportRequest {
    /// Resource attributes shared by all records in the batch.
    pub resource: ResourcePayload,
    /// Records grouped by scope, scopes in first-seen order.
    pub scope_logs: Vec<ScopeLogs>,
}

/// One span event on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEventPayload {
    /// Event name.
    pub name: String,
    /// Event time as unix nanoseconds.
    pub time_unix_nano: String,
    /// Event attributes.
    pub attributes: Vec<KeyValue>,
}

/// One span on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanPayload {
    /// Trace identifier (hex).
    pub trace_id: String,
    /// Span identifier (hex).
    pub span_id: String,
    /// Parent span identifier, omitted for root spans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    /// Span name.
    pub name: String,
    /// Start time as unix nanoseconds.
    pub start_time_unix_nano: String,
    /// End time as unix nanoseconds.
    pub end_time_unix_nano: String,
    /// Span attributes.
    pub attributes: Vec<KeyValue>,
    /// Span events in recording order.
    pub events: Vec<SpanEventPayload>,
}

/// Spans created by one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSpans {
    /// The creating scope.
    pub scope: ScopePayload,
    /// Spans in enqueue order.
    pub spans: Vec<SpanPayload>,
}

/// Body of one span export request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanExportRequest {
    /// Resource attributes shared by all spans in the batch.
    pub resource: ResourcePayload,
    /// Spans grouped by scope, scopes in first-seen order.
    pub scope_spans: Vec<ScopeSpans>,
}

fn datetime_to_unix_nano(timestamp: DateTime<Utc>) -> String {
    timestamp.timestamp_nanos_opt().unwrap_or(0).to_string()
}

fn attributes_to_key_values(attributes: &HashMap<String, serde_json::Value>) -> Vec<KeyValue> {
    let mut pairs: Vec<KeyValue> = attributes
        .iter()
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();
    // HashMap iteration order is arbitrary; sort for a stable payload.
    pairs.sort_by(|a, b| a.key.cmp(&b.key));
    pairs
}

fn resource_payload(resource: &Resource) -> ResourcePayload {
    ResourcePayload {
        attributes: resource
            .attributes()
            .map(|(key, value)| KeyValue {
                key: key.to_string(),
                value: serde_json::Value::String(value.to_string()),
            })
            .collect(),
    }
}

impl LogExportRequest {
    /// Builds the payload for one batch of log records.
    ///
    /// Records keep their enqueue order within each scope; scopes appear in
    /// the order they are first seen in the batch.
    #[must_use]
    pub fn from_batch(resource: &Resource, batch: &[LogRecord]) -> Self {
        let mut scope_logs: Vec<ScopeLogs> = Vec::new();
        for record in batch {
            let payload = LogRecordPayload {
                time_unix_nano: datetime_to_unix_nano(record.timestamp),
                severity_number: record.severity.severity_number(),
                severity_text: record.severity.to_string(),
                body: serde_json::Value::String(record.body.clone()),
                attributes: attributes_to_key_values(&record.attributes),
            };
            match scope_logs
                .iter_mut()
                .find(|scope| scope.scope.name == record.scope)
            {
                Some(scope) => scope.log_records.push(payload),
                None => scope_logs.push(ScopeLogs {
                    scope: ScopePayload {
                        name: record.scope.clone(),
                    },
                    log_records: vec![payload],
                }),
            }
        }
        Self {
            resource: resource_payload(resource),
            scope_logs,
        }
    }
}

impl SpanExportRequest {
    /// Builds the payload for one batch of finished spans.
    #[must_use]
    pub fn from_batch(resource: &Resource, batch: &[SpanData]) -> Self {
        let mut scope_spans: Vec<ScopeSpans> = Vec::new();
        for span in batch {
            let payload = SpanPayload {
                trace_id: span.trace_id.clone(),
                span_id: span.span_id.clone(),
                parent_span_id: span.parent_span_id.clone(),
                name: span.name.clone(),
                start_time_unix_nano: datetime_to_unix_nano(span.start_time),
                end_time_unix_nano: datetime_to_unix_nano(span.end_time),
                attributes: attributes_to_key_values(&span.attributes),
                events: span
                    .events
                    .iter()
                    .map(|event| SpanEventPayload {
                        name: event.name.clone(),
                        time_unix_nano: datetime_to_unix_nano(event.timestamp),
                        attributes: attributes_to_key_values(&event.attributes),
                    })
                    .collect(),
            };
            match scope_spans
                .iter_mut()
                .find(|scope| scope.scope.name == span.scope)
            {
                Some(scope) => scope.spans.push(payload),
                None => scope_spans.push(ScopeSpans {
                    scope: ScopePayload {
                        name: span.scope.clone(),
                    },
                    spans: vec![payload],
                }),
            }
        }
        Self {
            resource: resource_payload(resource),
            scope_spans,
        }
    }
}
