//! In-memory exporter.
//!
//! Captures exported batches in memory instead of sending them anywhere.
//! Suitable for development and testing, where assertions need to observe
//! exactly what the pipeline would have put on the wire.

use crate::export::{Exporter, ExportError};
use crate::models::{LogRecord, SpanData};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Captures log record batches.
pub type InMemoryLogExporter = InMemoryExporter<LogRecord>;

/// Captures span batches.
pub type InMemorySpanExporter = InMemoryExporter<SpanData>;

/// Exporter that stores every batch it receives.
///
/// Cloning is cheap and all clones observe the same captured batches.
///
/// # Example
///
/// ```
/// use telemetry::export::{Exporter, InMemoryLogExporter};
/// use telemetry::models::{LogRecord, Severity};
///
/// # tokio_test::block_on(async {
/// let exporter = InMemoryLogExporter::new();
/// exporter
///     .export(vec![LogRecord::new(Severity::Info, "ping")])
///     .await
///     .unwrap();
///
/// assert_eq!(exporter.batch_count(), 1);
/// assert_eq!(exporter.records()[0].body, "ping");
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryExporter<T> {
    batches: Arc<RwLock<Vec<Vec<T>>>>,
}

impl<T> Clone for InMemoryExporter<T> {
    fn clone(&self) -> Self {
        Self {
            batches: Arc::clone(&self.batches),
        }
    }
}

impl<T> Default for InMemoryExporter<T> {
    fn default() -> Self {
        Self {
            batches: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Clone> InMemoryExporter<T> {
    /// Creates an empty exporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured batches, in export order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<T>> {
        self.batches.read().map(|b| b.clone()).unwrap_or_default()
    }

    /// Returns all captured records, flattened in export order.
    #[must_use]
    pub fn records(&self) -> Vec<T> {
        self.batches
            .read()
            .map(|b| b.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the number of batches captured so far.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.read().map(|b| b.len()).unwrap_or(0)
    }

    /// Discards all captured batches.
    pub fn clear(&self) {
        if let Ok(mut batches) = self.batches.write() {
            batches.clear();
        }
    }
}

#[async_trait]
impl<T> Exporter<T> for InMemoryExporter<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn export(&self, batch: Vec<T>) -> Result<(), ExportError> {
        self.batches
            .write()
            .map_err(|_| ExportError::Lock)?
            .push(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    #[tokio::test]
    async fn test_batches_are_captured_in_order() {
        let exporter = InMemoryLogExporter::new();

        exporter
            .export(vec![LogRecord::new(Severity::Info, "first")])
            .await
            .unwrap();
        exporter
            .export(vec![
                LogRecord::new(Severity::Info, "second"),
                LogRecord::new(Severity::Info, "third"),
            ])
            .await
            .unwrap();

        assert_eq!(exporter.batch_count(), 2);
        let bodies: Vec<String> = exporter.records().into_iter().map(|r| r.body).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_clones_share_captured_batches() {
        let exporter = InMemoryLogExporter::new();
        let observer = exporter.clone();

        exporter
            .export(vec![LogRecord::new(Severity::Info, "shared")])
            .await
            .unwrap();

        assert_eq!(observer.batch_count(), 1);
        observer.clear();
        assert_eq!(exporter.batch_count(), 0);
    }
}
