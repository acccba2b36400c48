//! Lightbeam Telemetry Library
//!
//! This crate turns in-process log records and trace spans into batched
//! network deliveries to a remote collector. It provides the full pipeline:
//! per-signal exporters, bounded batch processors with background flushing,
//! a process-wide provider registry, automatic HTTP instrumentation hooks,
//! and a bootstrap that ties startup ordering and graceful shutdown together.
//!
//! # Modules
//!
//! - [`models`] - Log records, spans, and severity levels
//! - [`config`] - Buffer, exporter, and pipeline configuration
//! - [`export`] - Exporter trait and HTTP/in-memory implementations
//! - [`processor`] - Bounded queue with scheduled batch flushing
//! - [`provider`] - Logger/tracer providers and the global registry
//! - [`instrument`] - HTTP server/router/client span hooks
//! - [`bootstrap`] - Pipeline lifecycle (`start`/`stop` state machine)
//!
//! # Example
//!
//! ```no_run
//! use telemetry::bootstrap::Telemetry;
//! use telemetry::config::{ExporterConfig, LogsConfig, TelemetryConfig};
//! use telemetry::models::{LogRecord, Severity};
//! use telemetry::resource::Resource;
//!
//! # async fn example() -> Result<(), telemetry::TelemetryError> {
//! let config = TelemetryConfig::new(Resource::new("my-service"))
//!     .with_logs(LogsConfig::http(ExporterConfig::new("http://collector:4318/v1/logs")));
//!
//! let pipeline = Telemetry::new();
//! pipeline.start(config).await?;
//!
//! let logger = pipeline.registry().logger("my_module");
//! logger.emit(LogRecord::new(Severity::Info, "hello"));
//!
//! pipeline.stop().await;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod export;
pub mod instrument;
pub mod models;
pub mod processor;
pub mod provider;
pub mod resource;
pub mod wire;

pub use error::TelemetryError;
pub use provider::{global_logger, global_tracer};

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde_json;

/// Serializes tests that touch the process-wide registry slot.
#[cfg(test)]
pub(crate) static GLOBAL_TEST_LOCK: once_cell::sync::Lazy<tokio::sync::Mutex<()>> =
    once_cell::sync::Lazy::new(|| tokio::sync::Mutex::new(()));
