//! Exporters: transmission of one batch to its destination.
//!
//! An [`Exporter`] sends a batch of records in a single call and reports
//! success or failure. Exporters never retry internally; a failed batch is
//! terminal and it is the processor's job to log and discard it.
//!
//! Three implementations ship with the pipeline: [`HttpLogExporter`] /
//! [`HttpSpanExporter`] POST batches to a collector, [`ConsoleExporter`]
//! writes each record to stdout, and [`InMemoryExporter`] captures batches
//! for development and testing.

pub mod http;
pub mod memory;

pub use http::{HttpLogExporter, HttpSpanExporter};
pub use memory::{InMemoryExporter, InMemoryLogExporter, InMemorySpanExporter};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while exporting one batch.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The payload could not be serialized.
    #[error("Failed to encode export payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// The payload could not be compressed.
    #[error("Failed to compress export payload: {0}")]
    Compress(#[from] std::io::Error),

    /// The request could not be sent or the response not read.
    #[error("Export transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collector answered with a non-success status.
    #[error("Collector rejected batch with status {status}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
    },

    /// An exporter-internal lock was poisoned.
    #[error("Exporter lock poisoned")]
    Lock,
}

/// Transmits one batch of records to its destination.
///
/// Implementations must be thread-safe; the batch processor calls `export`
/// from its background task and from the shutdown flush path. A failed
/// export is terminal for the batch: no retry, no requeue.
#[async_trait]
pub trait Exporter<T: Send + 'static>: Send + Sync {
    /// Sends one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be delivered; the records
    /// are lost in that case.
    async fn export(&self, batch: Vec<T>) -> Result<(), ExportError>;
}

/// Exporter that prints each record to stdout as one JSON line.
///
/// Useful for local development, where a collector may not be running.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleExporter;

#[async_trait]
impl<T> Exporter<T> for ConsoleExporter
where
    T: serde::Serialize + Send + 'static,
{
    async fn export(&self, batch: Vec<T>) -> Result<(), ExportError> {
        for item in &batch {
            println!("{}", serde_json::to_string(item)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogRecord, Severity};

    #[tokio::test]
    async fn test_console_exporter_accepts_batches() {
        let exporter = ConsoleExporter;
        let batch = vec![LogRecord::new(Severity::Info, "hello")];
        assert!(exporter.export(batch).await.is_ok());
    }
}
