//! Batch processor: bounded buffering between emitters and an exporter.
//!
//! The processor decouples the emitting caller, which must never block on
//! network I/O, from the exporter. Records are appended to a bounded queue;
//! a background task drains them in batches, either when a full batch has
//! accumulated or when the scheduled delay elapses, whichever comes first.
//! When the queue is full the newest record is dropped and counted -
//! telemetry must never break application logic.

use crate::config::BufferConfig;
use crate::export::Exporter;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Buffers records for one signal and flushes them to an exporter.
///
/// Created by the bootstrap with the signal's [`BufferConfig`]; the
/// background flush task starts immediately. Must be constructed inside a
/// Tokio runtime.
pub struct BatchProcessor<T: Send + 'static> {
    inner: Arc<Inner<T>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Inner<T: Send + 'static> {
    signal: &'static str,
    config: BufferConfig,
    exporter: Arc<dyn Exporter<T>>,
    queue: Mutex<VecDeque<T>>,
    dropped: AtomicU64,
    batch_ready: Notify,
    shutdown_signal: Notify,
    shutting_down: AtomicBool,
}

impl<T: Send + 'static> BatchProcessor<T> {
    /// Creates a processor and starts its background flush task.
    #[must_use]
    pub fn new(signal: &'static str, exporter: Arc<dyn Exporter<T>>, config: BufferConfig) -> Self {
        let inner = Arc::new(Inner {
            signal,
            config,
            exporter,
            queue: Mutex::new(VecDeque::new()),
            dropped: AtomicU64::new(0),
            batch_ready: Notify::new(),
            shutdown_signal: Notify::new(),
            shutting_down: AtomicBool::new(false),
        });
        let worker = tokio::spawn(run_worker(Arc::clone(&inner)));
        Self {
            inner,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Appends a record to the queue.
    ///
    /// Never blocks and never fails from the caller's point of view: if the
    /// queue is at capacity (or the processor is shutting down) the record
    /// is dropped and the drop counter incremented.
    pub fn enqueue(&self, item: T) {
        if self.inner.shutting_down.load(Ordering::SeqCst) {
            self.inner.count_drop();
            return;
        }

        let len = {
            let mut queue = match self.inner.queue.lock() {
                Ok(queue) => queue,
                Err(_) => return,
            };
            if queue.len() >= self.inner.config.max_queue_size {
                drop(queue);
                self.inner.count_drop();
                return;
            }
            queue.push_back(item);
            queue.len()
        };

        if len >= self.inner.config.max_export_batch_size {
            self.inner.batch_ready.notify_one();
        }
    }

    /// Number of records dropped because the queue was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Number of records currently queued.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.inner.queue_len()
    }

    /// Drains and exports everything currently queued.
    ///
    /// Awaits each export up to the configured export timeout. Returns
    /// `true` only if every batch was delivered; failures are logged, not
    /// raised. Only the shutdown path calls this, so it never adds latency
    /// to request handling.
    pub async fn force_flush(&self) -> bool {
        let mut success = true;
        loop {
            let batch = self.inner.take_batch();
            if batch.is_empty() {
                break;
            }
            success &= self.inner.export_batch(batch).await;
        }
        success
    }

    /// Stops the background flush task.
    ///
    /// Does not flush: the orchestrator must call
    /// [`force_flush`](Self::force_flush) first. Records enqueued after
    /// shutdown are dropped.
    pub async fn shutdown(&self) {
        if self.inner.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.shutdown_signal.notify_one();

        let worker = match self.worker.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = worker {
            if handle.await.is_err() {
                tracing::warn!(
                    signal = self.inner.signal,
                    "Flush worker terminated abnormally"
                );
            }
        }

        let dropped = self.dropped_count();
        if dropped > 0 {
            tracing::warn!(
                signal = self.inner.signal,
                dropped,
                "Records were dropped because the queue was full"
            );
        }
    }
}

impl<T: Send + 'static> Drop for BatchProcessor<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.worker.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

impl<T: Send + 'static> Inner<T> {
    fn count_drop(&self) {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if dropped == 1 {
            tracing::warn!(
                signal = self.signal,
                "Telemetry queue full, dropping new records"
            );
        }
    }

    fn queue_len(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    /// Removes up to one batch from the front of the queue.
    fn take_batch(&self) -> Vec<T> {
        let mut queue = match self.queue.lock() {
            Ok(queue) => queue,
            Err(_) => return Vec::new(),
        };
        let size = queue.len().min(self.config.max_export_batch_size);
        queue.drain(..size).collect()
    }

    async fn export_batch(&self, batch: Vec<T>) -> bool {
        let size = batch.len();
        match tokio::time::timeout(self.config.export_timeout, self.exporter.export(batch)).await {
            Ok(Ok(())) => {
                tracing::debug!(signal = self.signal, size, "Exported batch");
                true
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    signal = self.signal,
                    size,
                    error = %err,
                    "Export failed, discarding batch"
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    signal = self.signal,
                    size,
                    timeout = ?self.config.export_timeout,
                    "Export timed out, discarding batch"
                );
                false
            }
        }
    }
}

/// Background flush loop.
///
/// Wakes when a full batch is ready or the scheduled delay elapses and
/// exports one batch per wake. While a full batch remains queued it re-arms
/// itself immediately, so bursts drain without waiting out the delay.
async fn run_worker<T: Send + 'static>(inner: Arc<Inner<T>>) {
    loop {
        tokio::select! {
            () = tokio::time::sleep(inner.config.scheduled_delay) => {}
            () = inner.batch_ready.notified() => {}
            () = inner.shutdown_signal.notified() => break,
        }
        if inner.shutting_down.load(Ordering::SeqCst) {
            break;
        }

        let batch = inner.take_batch();
        if !batch.is_empty() {
            inner.export_batch(batch).await;
        }
        if inner.queue_len() >= inner.config.max_export_batch_size {
            inner.batch_ready.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportError, InMemoryLogExporter};
    use crate::models::{LogRecord, Severity};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Exporter that fails every batch, for shutdown-path tests.
    struct FailingExporter;

    #[async_trait]
    impl Exporter<LogRecord> for FailingExporter {
        async fn export(&self, _batch: Vec<LogRecord>) -> Result<(), ExportError> {
            Err(ExportError::Rejected { status: 503 })
        }
    }

    fn record(body: &str) -> LogRecord {
        LogRecord::new(Severity::Info, body)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within 2s");
    }

    #[tokio::test]
    async fn test_scheduled_flush_exports_all_in_order() {
        let exporter = InMemoryLogExporter::new();
        let config = BufferConfig::default().with_scheduled_delay(Duration::from_millis(50));
        let processor = BatchProcessor::new("logs", Arc::new(exporter.clone()), config);

        processor.enqueue(record("one"));
        processor.enqueue(record("two"));
        processor.enqueue(record("three"));

        wait_until(|| exporter.batch_count() >= 1).await;

        let batches = exporter.batches();
        assert_eq!(batches.len(), 1);
        let bodies: Vec<&str> = batches[0].iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);

        processor.shutdown().await;
    }

    #[tokio::test]
    async fn test_capacity_flush_before_delay() {
        let exporter = InMemoryLogExporter::new();
        let config = BufferConfig::default()
            .with_max_export_batch_size(2)
            .with_scheduled_delay(Duration::from_secs(600));
        let processor = BatchProcessor::new("logs", Arc::new(exporter.clone()), config);

        processor.enqueue(record("one"));
        processor.enqueue(record("two"));

        wait_until(|| exporter.batch_count() >= 1).await;
        assert_eq!(exporter.records().len(), 2);

        processor.shutdown().await;
    }

    #[tokio::test]
    async fn test_overflow_drops_newest_and_counts() {
        let exporter = InMemoryLogExporter::new();
        let config = BufferConfig::default()
            .with_max_queue_size(5)
            .with_scheduled_delay(Duration::from_secs(600));
        let processor = BatchProcessor::new("logs", Arc::new(exporter.clone()), config);

        for i in 0..10 {
            processor.enqueue(record(&format!("record-{i}")));
        }

        assert_eq!(processor.queue_len(), 5);
        assert_eq!(processor.dropped_count(), 5);

        assert!(processor.force_flush().await);
        let bodies: Vec<String> = exporter.records().into_iter().map(|r| r.body).collect();
        // The oldest five survive; the newest five were dropped.
        assert_eq!(
            bodies,
            vec!["record-0", "record-1", "record-2", "record-3", "record-4"]
        );

        processor.shutdown().await;
    }

    #[tokio::test]
    async fn test_force_flush_exports_everything_queued() {
        let exporter = InMemoryLogExporter::new();
        let config = BufferConfig::default()
            .with_max_export_batch_size(4)
            .with_scheduled_delay(Duration::from_secs(600));
        let processor = BatchProcessor::new("logs", Arc::new(exporter.clone()), config);

        for i in 0..10 {
            processor.enqueue(record(&format!("record-{i}")));
        }

        assert!(processor.force_flush().await);
        assert_eq!(exporter.records().len(), 10);
        // Batches respect the configured maximum size.
        assert!(exporter.batches().iter().all(|b| b.len() <= 4));
        assert_eq!(processor.queue_len(), 0);

        processor.shutdown().await;
    }

    #[tokio::test]
    async fn test_force_flush_reports_failure() {
        let config = BufferConfig::default().with_scheduled_delay(Duration::from_secs(600));
        let processor = BatchProcessor::new("logs", Arc::new(FailingExporter), config);

        processor.enqueue(record("doomed"));
        assert!(!processor.force_flush().await);
        // The failed batch is discarded, not requeued.
        assert_eq!(processor.queue_len(), 0);

        processor.shutdown().await;
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_drops() {
        let exporter = InMemoryLogExporter::new();
        let config = BufferConfig::default().with_scheduled_delay(Duration::from_secs(600));
        let processor = BatchProcessor::new("logs", Arc::new(exporter.clone()), config);

        processor.shutdown().await;
        processor.enqueue(record("late"));

        assert_eq!(processor.dropped_count(), 1);
        assert_eq!(exporter.batch_count(), 0);
    }
}
