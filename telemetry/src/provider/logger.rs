//! Logger provider and handles.

use crate::config::BufferConfig;
use crate::export::Exporter;
use crate::models::{LogRecord, Severity};
use crate::processor::BatchProcessor;
use std::sync::Arc;

/// Owns the log signal's batch processor.
///
/// One per pipeline. Handles created by [`LoggerProvider::logger`] feed
/// records into the processor; the bootstrap flushes and shuts the
/// processor down at `stop`.
pub struct LoggerProvider {
    processor: BatchProcessor<LogRecord>,
    min_severity: Severity,
}

impl LoggerProvider {
    /// Creates a provider with its own batch processor.
    ///
    /// Must be called within a Tokio runtime; the processor's background
    /// flush task starts immediately.
    #[must_use]
    pub fn new(
        exporter: Arc<dyn Exporter<LogRecord>>,
        buffer: BufferConfig,
        min_severity: Severity,
    ) -> Self {
        Self {
            processor: BatchProcessor::new("logs", exporter, buffer),
            min_severity,
        }
    }

    /// Returns a logger handle tagged with the given scope name.
    ///
    /// An empty scope falls back to
    /// [`DEFAULT_SCOPE`](crate::provider::DEFAULT_SCOPE).
    #[must_use]
    pub fn logger(self: &Arc<Self>, scope: &str) -> Logger {
        Logger {
            scope: crate::provider::scope_or_default(scope),
            provider: Some(Arc::clone(self)),
        }
    }

    /// Drains and exports all buffered records.
    pub async fn force_flush(&self) -> bool {
        self.processor.force_flush().await
    }

    /// Stops the background flush task.
    pub async fn shutdown(&self) {
        self.processor.shutdown().await;
    }

    /// Number of records dropped because the queue was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.processor.dropped_count()
    }
}

/// Handle for emitting log records, tagged with a scope name.
///
/// Cloning is cheap. Emitting never blocks and never fails; records below
/// the pipeline's minimum severity are discarded at this point.
#[derive(Clone)]
pub struct Logger {
    scope: Arc<str>,
    provider: Option<Arc<LoggerProvider>>,
}

impl Logger {
    /// Creates a handle that discards everything.
    ///
    /// Returned wherever the logs signal is disabled or no pipeline is
    /// running, so calling code never needs a special case.
    #[must_use]
    pub fn noop(scope: &str) -> Self {
        Self {
            scope: crate::provider::scope_or_default(scope),
            provider: None,
        }
    }

    /// The scope name this handle tags records with.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Whether records emitted through this handle can reach an exporter.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Emits a record into the pipeline.
    ///
    /// The record's scope is set to this handle's scope. Fire-and-forget:
    /// the caller is never blocked and never sees a failure.
    pub fn emit(&self, mut record: LogRecord) {
        let Some(provider) = &self.provider else {
            return;
        };
        if record.severity < provider.min_severity {
            return;
        }
        record.scope = self.scope.to_string();
        provider.processor.enqueue(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::InMemoryLogExporter;

    fn provider(exporter: &InMemoryLogExporter, min_severity: Severity) -> Arc<LoggerProvider> {
        Arc::new(LoggerProvider::new(
            Arc::new(exporter.clone()),
            BufferConfig::default(),
            min_severity,
        ))
    }

    #[tokio::test]
    async fn test_emit_tags_scope() {
        let exporter = InMemoryLogExporter::new();
        let provider = provider(&exporter, Severity::Debug);

        provider
            .logger("auth")
            .emit(LogRecord::new(Severity::Info, "logged in"));
        provider.force_flush().await;

        let records = exporter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scope, "auth");
        provider.shutdown().await;
    }

    #[tokio::test]
    async fn test_min_severity_filter() {
        let exporter = InMemoryLogExporter::new();
        let provider = provider(&exporter, Severity::Warn);
        let logger = provider.logger("scope");

        logger.emit(LogRecord::new(Severity::Debug, "too quiet"));
        logger.emit(LogRecord::new(Severity::Info, "still too quiet"));
        logger.emit(LogRecord::new(Severity::Warn, "heard"));
        logger.emit(LogRecord::new(Severity::Error, "heard too"));
        provider.force_flush().await;

        let bodies: Vec<String> = exporter.records().into_iter().map(|r| r.body).collect();
        assert_eq!(bodies, vec!["heard", "heard too"]);
        provider.shutdown().await;
    }

    #[tokio::test]
    async fn test_same_scope_handles_equivalent() {
        let exporter = InMemoryLogExporter::new();
        let provider = provider(&exporter, Severity::Debug);

        provider
            .logger("a")
            .emit(LogRecord::new(Severity::Info, "one"));
        provider
            .logger("a")
            .emit(LogRecord::new(Severity::Info, "two"));
        provider.force_flush().await;

        let records = exporter.records();
        assert!(records.iter().all(|r| r.scope == "a"));
        provider.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_scope_falls_back_to_default() {
        let exporter = InMemoryLogExporter::new();
        let provider = provider(&exporter, Severity::Debug);

        assert_eq!(provider.logger("").scope(), "default");
        provider.shutdown().await;
    }

    #[test]
    fn test_noop_logger_discards() {
        let logger = Logger::noop("scope");
        assert!(!logger.enabled());
        logger.emit(LogRecord::new(Severity::Error, "dropped"));
    }
}
