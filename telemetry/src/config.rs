//! Pipeline configuration.
//!
//! Configuration is a set of closed structs validated at `start`, one per
//! concern: batching tunables ([`BufferConfig`]), transport parameters
//! ([`ExporterConfig`]), and per-signal wiring ([`LogsConfig`],
//! [`TracesConfig`]) assembled into a [`TelemetryConfig`].

use crate::error::TelemetryError;
use crate::export::Exporter;
use crate::instrument::HookConfig;
use crate::models::{LogRecord, Severity, SpanData};
use crate::resource::Resource;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Batching parameters for one signal's processor.
///
/// Caller overrides merge over the defaults: construct with
/// [`BufferConfig::default`] and change only the fields you need.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use telemetry::config::BufferConfig;
///
/// let config = BufferConfig::default().with_scheduled_delay(Duration::from_secs(1));
///
/// assert_eq!(config.max_export_batch_size, 512);
/// assert_eq!(config.scheduled_delay, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Maximum number of records exported in one batch.
    pub max_export_batch_size: usize,
    /// Maximum number of records held in the queue; newer records are
    /// dropped once this is reached.
    pub max_queue_size: usize,
    /// Interval between scheduled background flushes.
    pub scheduled_delay: Duration,
    /// Maximum time allowed for a single export call.
    pub export_timeout: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_export_batch_size: 512,
            max_queue_size: 2048,
            scheduled_delay: Duration::from_millis(5000),
            export_timeout: Duration::from_millis(30_000),
        }
    }
}

impl BufferConfig {
    /// Sets the maximum export batch size.
    #[must_use]
    pub fn with_max_export_batch_size(mut self, size: usize) -> Self {
        self.max_export_batch_size = size;
        self
    }

    /// Sets the maximum queue size.
    #[must_use]
    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    /// Sets the scheduled flush interval.
    #[must_use]
    pub fn with_scheduled_delay(mut self, delay: Duration) -> Self {
        self.scheduled_delay = delay;
        self
    }

    /// Sets the per-export timeout.
    #[must_use]
    pub fn with_export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = timeout;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is zero.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.max_export_batch_size == 0 {
            return Err(TelemetryError::InvalidBufferConfig("max_export_batch_size"));
        }
        if self.max_queue_size == 0 {
            return Err(TelemetryError::InvalidBufferConfig("max_queue_size"));
        }
        if self.scheduled_delay.is_zero() {
            return Err(TelemetryError::InvalidBufferConfig("scheduled_delay"));
        }
        if self.export_timeout.is_zero() {
            return Err(TelemetryError::InvalidBufferConfig("export_timeout"));
        }
        Ok(())
    }
}

/// Payload compression applied by an HTTP exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Send the payload uncompressed.
    #[default]
    None,
    /// Gzip the payload and set `content-encoding: gzip`.
    Gzip,
}

/// Transport parameters for one HTTP exporter.
///
/// # Example
///
/// ```
/// use telemetry::config::{Compression, ExporterConfig};
///
/// let config = ExporterConfig::new("http://collector:4318/v1/traces")
///     .with_basic_auth("user", "secret")
///     .with_compression(Compression::Gzip);
///
/// assert!(config.headers.contains_key("authorization"));
/// ```
#[derive(Debug, Clone, Validate)]
pub struct ExporterConfig {
    /// Destination URL batches are POSTed to.
    #[validate(length(min = 1, message = "Endpoint URL cannot be empty"))]
    pub endpoint: String,

    /// Headers sent with every export request.
    pub headers: HashMap<String, String>,

    /// Compression applied to the payload.
    pub compression: Compression,

    /// Network timeout for a single request.
    pub timeout: Duration,
}

impl ExporterConfig {
    /// Creates an exporter configuration for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers: HashMap::new(),
            compression: Compression::None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Adds a header to send with every export request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds an `authorization: Basic ...` header from the given credentials.
    #[must_use]
    pub fn with_basic_auth(self, username: &str, password: &str) -> Self {
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{username}:{password}"));
        self.with_header("authorization", format!("Basic {token}"))
    }

    /// Sets the payload compression.
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the network timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the path portion of the endpoint URL.
    ///
    /// Used by the instrumentation hooks to suppress spans for the
    /// pipeline's own export traffic. Falls back to the raw endpoint string
    /// if it does not parse as a URL.
    #[must_use]
    pub fn endpoint_path(&self) -> String {
        reqwest::Url::parse(&self.endpoint)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| self.endpoint.clone())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty or not a valid URL.
    pub fn validate_config(&self) -> Result<(), TelemetryError> {
        self.validate()?;
        if reqwest::Url::parse(&self.endpoint).is_err() {
            return Err(TelemetryError::InvalidEndpoint {
                url: self.endpoint.clone(),
            });
        }
        Ok(())
    }
}

/// Where a signal's batches are delivered.
///
/// [`Http`](ExportTarget::Http) is the production transport. `Console`
/// writes each record to stdout, and `Custom` plugs in any
/// [`Exporter`] implementation (used by tests and local development).
#[derive(Clone)]
pub enum ExportTarget<T: Send + 'static> {
    /// POST batches to a collector endpoint.
    Http(ExporterConfig),
    /// Print each record to stdout as one JSON line.
    Console,
    /// Deliver batches to a caller-supplied exporter.
    Custom(Arc<dyn Exporter<T>>),
}

impl<T: Send + 'static> std::fmt::Debug for ExportTarget<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(config) => f.debug_tuple("Http").field(config).finish(),
            Self::Console => f.write_str("Console"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<T: Send + 'static> ExportTarget<T> {
    fn validate(&self) -> Result<(), TelemetryError> {
        match self {
            Self::Http(config) => config.validate_config(),
            Self::Console | Self::Custom(_) => Ok(()),
        }
    }

    /// Returns the endpoint path when this target is an HTTP exporter.
    #[must_use]
    pub fn endpoint_path(&self) -> Option<String> {
        match self {
            Self::Http(config) => Some(config.endpoint_path()),
            Self::Console | Self::Custom(_) => None,
        }
    }
}

/// Configuration for the logs signal.
#[derive(Debug, Clone)]
pub struct LogsConfig {
    /// Where log batches are delivered.
    pub target: ExportTarget<LogRecord>,
    /// Batching parameters for the log processor.
    pub buffer: BufferConfig,
}

impl LogsConfig {
    /// Creates a logs configuration with an HTTP exporter and default
    /// batching.
    #[must_use]
    pub fn http(exporter: ExporterConfig) -> Self {
        Self {
            target: ExportTarget::Http(exporter),
            buffer: BufferConfig::default(),
        }
    }

    /// Creates a logs configuration with a caller-supplied exporter.
    #[must_use]
    pub fn custom(exporter: Arc<dyn Exporter<LogRecord>>) -> Self {
        Self {
            target: ExportTarget::Custom(exporter),
            buffer: BufferConfig::default(),
        }
    }

    /// Overrides the batching parameters.
    #[must_use]
    pub fn with_buffer(mut self, buffer: BufferConfig) -> Self {
        self.buffer = buffer;
        self
    }

    fn validate(&self) -> Result<(), TelemetryError> {
        self.target.validate()?;
        self.buffer.validate()
    }
}

/// Configuration for the traces signal.
#[derive(Debug, Clone)]
pub struct TracesConfig {
    /// Where span batches are delivered.
    pub target: ExportTarget<SpanData>,
    /// Batching parameters for the span processor.
    pub buffer: BufferConfig,
}

impl TracesConfig {
    /// Creates a traces configuration with an HTTP exporter and default
    /// batching.
    #[must_use]
    pub fn http(exporter: ExporterConfig) -> Self {
        Self {
            target: ExportTarget::Http(exporter),
            buffer: BufferConfig::default(),
        }
    }

    /// Creates a traces configuration with a caller-supplied exporter.
    #[must_use]
    pub fn custom(exporter: Arc<dyn Exporter<SpanData>>) -> Self {
        Self {
            target: ExportTarget::Custom(exporter),
            buffer: BufferConfig::default(),
        }
    }

    /// Overrides the batching parameters.
    #[must_use]
    pub fn with_buffer(mut self, buffer: BufferConfig) -> Self {
        self.buffer = buffer;
        self
    }

    fn validate(&self) -> Result<(), TelemetryError> {
        self.target.validate()?;
        self.buffer.validate()
    }
}

/// Complete pipeline configuration handed to
/// [`Telemetry::start`](crate::bootstrap::Telemetry::start).
///
/// A signal left as `None` is disabled: its provider hands out no-op
/// handles and nothing is buffered or exported for it.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Identity attributes attached to every exported record and span.
    pub resource: Resource,
    /// Logs signal wiring, if enabled.
    pub logs: Option<LogsConfig>,
    /// Traces signal wiring, if enabled.
    pub traces: Option<TracesConfig>,
    /// Records below this severity are discarded at emit time.
    pub min_severity: Severity,
    /// Which instrumentation hooks to install.
    pub hooks: HookConfig,
}

impl TelemetryConfig {
    /// Creates a configuration with both signals disabled.
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            logs: None,
            traces: None,
            min_severity: Severity::Info,
            hooks: HookConfig::default(),
        }
    }

    /// Enables the logs signal.
    #[must_use]
    pub fn with_logs(mut self, logs: LogsConfig) -> Self {
        self.logs = Some(logs);
        self
    }

    /// Enables the traces signal.
    #[must_use]
    pub fn with_traces(mut self, traces: TracesConfig) -> Self {
        self.traces = Some(traces);
        self
    }

    /// Sets the minimum severity exported for log records.
    #[must_use]
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Sets the instrumentation hook configuration.
    #[must_use]
    pub fn with_hooks(mut self, hooks: HookConfig) -> Self {
        self.hooks = hooks;
        self
    }

    /// Validates the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found: an invalid endpoint,
    /// a zero buffer tunable, or an inconsistent hook combination.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if let Some(logs) = &self.logs {
            logs.validate()?;
        }
        if let Some(traces) = &self.traces {
            traces.validate()?;
        }
        self.hooks.validate()
    }

    /// Collects the endpoint paths of all configured HTTP exporters.
    ///
    /// These paths feed the instrumentation hooks' self-exclusion filter.
    #[must_use]
    pub fn export_paths(&self) -> Vec<String> {
        self.logs
            .iter()
            .filter_map(|logs| logs.target.endpoint_path())
            .chain(
                self.traces
                    .iter()
                    .filter_map(|traces| traces.target.endpoint_path()),
            )
            .collect()
    }
}
