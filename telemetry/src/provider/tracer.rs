//! Tracer provider, tracer handles, and live spans.

use crate::config::BufferConfig;
use crate::export::Exporter;
use crate::models::{SpanContext, SpanData, SpanEvent};
use crate::processor::BatchProcessor;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the trace signal's batch processor.
pub struct TracerProvider {
    processor: BatchProcessor<SpanData>,
}

impl TracerProvider {
    /// Creates a provider with its own batch processor.
    ///
    /// Must be called within a Tokio runtime; the processor's background
    /// flush task starts immediately.
    #[must_use]
    pub fn new(exporter: Arc<dyn Exporter<SpanData>>, buffer: BufferConfig) -> Self {
        Self {
            processor: BatchProcessor::new("traces", exporter, buffer),
        }
    }

    /// Returns a tracer handle tagged with the given scope name.
    ///
    /// An empty scope falls back to
    /// [`DEFAULT_SCOPE`](crate::provider::DEFAULT_SCOPE).
    #[must_use]
    pub fn tracer(self: &Arc<Self>, scope: &str) -> Tracer {
        Tracer {
            scope: crate::provider::scope_or_default(scope),
            provider: Some(Arc::clone(self)),
        }
    }

    /// Drains and exports all buffered spans.
    pub async fn force_flush(&self) -> bool {
        self.processor.force_flush().await
    }

    /// Stops the background flush task.
    pub async fn shutdown(&self) {
        self.processor.shutdown().await;
    }

    /// Number of spans dropped because the queue was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.processor.dropped_count()
    }
}

/// Handle for starting spans, tagged with a scope name.
#[derive(Clone)]
pub struct Tracer {
    scope: Arc<str>,
    provider: Option<Arc<TracerProvider>>,
}

impl Tracer {
    /// Creates a handle whose spans are never recorded.
    #[must_use]
    pub fn noop(scope: &str) -> Self {
        Self {
            scope: crate::provider::scope_or_default(scope),
            provider: None,
        }
    }

    /// The scope name this handle tags spans with.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Whether spans started by this handle can reach an exporter.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Starts a root span.
    #[must_use]
    pub fn start_span(&self, name: impl Into<String>) -> Span {
        self.start_span_with_parent(name, None)
    }

    /// Starts a span, optionally nested under a parent.
    ///
    /// A child span shares its parent's trace identifier.
    #[must_use]
    pub fn start_span_with_parent(
        &self,
        name: impl Into<String>,
        parent: Option<&SpanContext>,
    ) -> Span {
        let context = SpanContext {
            trace_id: parent.map_or_else(generate_trace_id, |p| p.trace_id.clone()),
            span_id: generate_span_id(),
        };
        Span {
            context,
            parent_span_id: parent.map(|p| p.span_id.clone()),
            name: name.into(),
            scope: Arc::clone(&self.scope),
            start_time: Utc::now(),
            attributes: HashMap::new(),
            events: Vec::new(),
            provider: self.provider.clone(),
            ended: false,
        }
    }
}

/// A live, timed unit of traced work.
///
/// Created by a [`Tracer`]; becomes exportable [`SpanData`] when
/// [`end`](Span::end) is called. A recording span dropped without `end` is
/// never exported - it is discarded and logged as a leak.
///
/// # Example
///
/// ```
/// use telemetry::provider::Tracer;
///
/// let tracer = Tracer::noop("worker");
/// let mut span = tracer.start_span("process job");
/// span.set_attribute("job.id", 7);
/// span.add_event("picked up");
/// span.end();
/// ```
pub struct Span {
    context: SpanContext,
    parent_span_id: Option<String>,
    name: String,
    scope: Arc<str>,
    start_time: DateTime<Utc>,
    attributes: HashMap<String, serde_json::Value>,
    events: Vec<SpanEvent>,
    provider: Option<Arc<TracerProvider>>,
    ended: bool,
}

impl Span {
    /// The identity of this span, usable as a parent reference.
    #[must_use]
    pub fn context(&self) -> &SpanContext {
        &self.context
    }

    /// Whether this span will be exported when ended.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.provider.is_some() && !self.ended
    }

    /// Sets an attribute on the span.
    ///
    /// Values that fail to serialize are stored as JSON null.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Serialize) {
        self.attributes.insert(
            key.into(),
            serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        );
    }

    /// Records a timestamped event on the span.
    pub fn add_event(&mut self, name: impl Into<String>) {
        self.events.push(SpanEvent::new(name));
    }

    /// Ends the span and hands it to the pipeline.
    ///
    /// Stamps the end time, guaranteeing `end_time >= start_time`. Calling
    /// `end` more than once has no further effect.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        let Some(provider) = self.provider.take() else {
            return;
        };
        provider.processor.enqueue(SpanData {
            trace_id: self.context.trace_id.clone(),
            span_id: self.context.span_id.clone(),
            parent_span_id: self.parent_span_id.take(),
            name: std::mem::take(&mut self.name),
            scope: self.scope.to_string(),
            start_time: self.start_time,
            end_time: Utc::now(),
            attributes: std::mem::take(&mut self.attributes),
            events: std::mem::take(&mut self.events),
        });
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if !self.ended && self.provider.is_some() {
            tracing::warn!(
                span = %self.name,
                scope = %self.scope,
                "Span dropped without end(), discarding"
            );
        }
    }
}

fn generate_trace_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

fn generate_span_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}
