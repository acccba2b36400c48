//! Pipeline lifecycle orchestration.
//!
//! [`Telemetry`] ties the pieces together: `start` validates the
//! configuration, builds exporters, processors, and providers, installs the
//! registry globally, and prepares the instrumentation hooks; `stop`
//! flushes and tears everything down in a fixed order. Both transitions are
//! serialized and idempotent, so the bootstrap can be invoked from multiple
//! entry points without double-building or double-stopping.

use crate::config::{ExportTarget, TelemetryConfig};
use crate::error::TelemetryError;
use crate::export::{ConsoleExporter, Exporter, HttpLogExporter, HttpSpanExporter};
use crate::instrument::{ExportPathFilter, Hooks};
use crate::models::{LogRecord, SpanData};
use crate::provider::{self, LoggerProvider, ProviderRegistry, TracerProvider};
use crate::resource::Resource;
use std::sync::{Arc, Mutex};

/// Lifecycle states of the pipeline.
///
/// `Stopped` is terminal: a process that needs telemetry again must be
/// restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryState {
    /// Created, never started.
    Uninitialized,
    /// `start` is building the pipeline.
    Starting,
    /// The pipeline is exporting.
    Running,
    /// `stop` is flushing and tearing down.
    Stopping,
    /// Terminal: torn down.
    Stopped,
}

struct Active {
    registry: ProviderRegistry,
    hooks: Option<Hooks>,
    registered_globally: bool,
}

/// Orchestrates pipeline startup and graceful shutdown.
///
/// # Example
///
/// ```no_run
/// use telemetry::bootstrap::Telemetry;
/// use telemetry::config::{ExporterConfig, LogsConfig, TelemetryConfig};
/// use telemetry::resource::Resource;
///
/// # async fn example() -> Result<(), telemetry::TelemetryError> {
/// let pipeline = Telemetry::new();
/// pipeline
///     .start(
///         TelemetryConfig::new(Resource::new("my-service")).with_logs(LogsConfig::http(
///             ExporterConfig::new("http://collector:4318/v1/logs"),
///         )),
///     )
///     .await?;
///
/// // ... serve traffic ...
///
/// pipeline.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct Telemetry {
    state: Mutex<TelemetryState>,
    lifecycle: tokio::sync::Mutex<()>,
    active: Mutex<Option<Active>>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    /// Creates an uninitialized pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TelemetryState::Uninitialized),
            lifecycle: tokio::sync::Mutex::new(()),
            active: Mutex::new(None),
        }
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TelemetryState {
        self.state
            .lock()
            .map_or(TelemetryState::Stopped, |state| *state)
    }

    fn set_state(&self, next: TelemetryState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    /// The registry of the running pipeline.
    ///
    /// Returns an empty registry (no-op handles) when the pipeline is not
    /// running.
    #[must_use]
    pub fn registry(&self) -> ProviderRegistry {
        self.active
            .lock()
            .ok()
            .and_then(|active| active.as_ref().map(|a| a.registry.clone()))
            .unwrap_or_default()
    }

    /// The installed instrumentation hooks, if any were enabled.
    #[must_use]
    pub fn hooks(&self) -> Option<Hooks> {
        self.active
            .lock()
            .ok()
            .and_then(|active| active.as_ref().and_then(|a| a.hooks.clone()))
    }

    /// Builds and starts the pipeline.
    ///
    /// Valid only before the first successful start: a second call while
    /// running is a logged no-op (first call wins), and a call after `stop`
    /// is rejected. A configuration error leaves the pipeline
    /// uninitialized, so a corrected configuration can be started.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration (bad endpoint or
    /// header, zero buffer tunable, inconsistent hook set) or when the
    /// pipeline was already stopped.
    pub async fn start(&self, config: TelemetryConfig) -> Result<(), TelemetryError> {
        let _guard = self.lifecycle.lock().await;

        match self.state() {
            TelemetryState::Uninitialized => {}
            TelemetryState::Starting | TelemetryState::Running => {
                tracing::warn!("Telemetry already started, ignoring start()");
                return Ok(());
            }
            TelemetryState::Stopping | TelemetryState::Stopped => {
                return Err(TelemetryError::AlreadyStopped);
            }
        }
        self.set_state(TelemetryState::Starting);

        match build_pipeline(config) {
            Ok(active) => {
                if let Ok(mut slot) = self.active.lock() {
                    *slot = Some(active);
                }
                self.set_state(TelemetryState::Running);
                tracing::info!("Telemetry pipeline started");
                Ok(())
            }
            Err(err) => {
                self.set_state(TelemetryState::Uninitialized);
                Err(err)
            }
        }
    }

    /// Drains and exports everything buffered on both signals.
    ///
    /// Returns `true` only if every batch was delivered. `stop` performs
    /// this flush itself; calling it separately is mainly useful in tests
    /// and at explicit checkpoints.
    pub async fn force_flush(&self) -> bool {
        let registry = self.registry();
        let mut success = true;
        if let Some(logger_provider) = registry.logger_provider() {
            success &= logger_provider.force_flush().await;
        }
        if let Some(tracer_provider) = registry.tracer_provider() {
            success &= tracer_provider.force_flush().await;
        }
        success
    }

    /// Flushes and tears the pipeline down.
    ///
    /// Order is fixed: flush logs, flush traces, shut both processors
    /// down, then disable global registration. Every step logs its own
    /// failure and never prevents later steps from running; `stop` itself
    /// never fails. Calling `stop` before `start`, or a second time, is a
    /// no-op.
    pub async fn stop(&self) {
        let _guard = self.lifecycle.lock().await;

        match self.state() {
            TelemetryState::Running => {}
            TelemetryState::Uninitialized | TelemetryState::Starting => {
                tracing::debug!("Telemetry stop() before start(), nothing to do");
                return;
            }
            TelemetryState::Stopping | TelemetryState::Stopped => {
                tracing::debug!("Telemetry already stopped");
                return;
            }
        }
        self.set_state(TelemetryState::Stopping);

        let active = self.active.lock().ok().and_then(|mut slot| slot.take());
        if let Some(active) = active {
            // Logs flush first: their loss is operationally more urgent
            // than trace loss. A failing step never aborts the teardown.
            if let Some(logger_provider) = active.registry.logger_provider() {
                if logger_provider.force_flush().await {
                    tracing::info!("Log records flushed");
                } else {
                    tracing::warn!("Failed to flush log records during shutdown");
                }
            }
            if let Some(tracer_provider) = active.registry.tracer_provider() {
                if tracer_provider.force_flush().await {
                    tracing::info!("Spans flushed");
                } else {
                    tracing::warn!("Failed to flush spans during shutdown");
                }
            }

            if let Some(logger_provider) = active.registry.logger_provider() {
                logger_provider.shutdown().await;
            }
            if let Some(tracer_provider) = active.registry.tracer_provider() {
                tracer_provider.shutdown().await;
            }

            if active.registered_globally {
                provider::clear_global();
            }
        }

        self.set_state(TelemetryState::Stopped);
        tracing::info!("Telemetry pipeline stopped");
    }
}

fn build_log_exporter(
    target: &ExportTarget<LogRecord>,
    resource: &Resource,
) -> Result<Arc<dyn Exporter<LogRecord>>, TelemetryError> {
    match target {
        ExportTarget::Http(config) => Ok(Arc::new(HttpLogExporter::new(
            config,
            resource.clone(),
        )?)),
        ExportTarget::Console => Ok(Arc::new(ConsoleExporter)),
        ExportTarget::Custom(exporter) => Ok(Arc::clone(exporter)),
    }
}

fn build_span_exporter(
    target: &ExportTarget<SpanData>,
    resource: &Resource,
) -> Result<Arc<dyn Exporter<SpanData>>, TelemetryError> {
    match target {
        ExportTarget::Http(config) => Ok(Arc::new(HttpSpanExporter::new(
            config,
            resource.clone(),
        )?)),
        ExportTarget::Console => Ok(Arc::new(ConsoleExporter)),
        ExportTarget::Custom(exporter) => Ok(Arc::clone(exporter)),
    }
}

fn build_pipeline(config: TelemetryConfig) -> Result<Active, TelemetryError> {
    config.validate()?;
    let export_paths = config.export_paths();

    // Exporter construction is the only fallible step; do all of it before
    // anything spawns a background task.
    let log_exporter = match &config.logs {
        Some(logs) => Some(build_log_exporter(&logs.target, &config.resource)?),
        None => None,
    };
    let span_exporter = match &config.traces {
        Some(traces) => Some(build_span_exporter(&traces.target, &config.resource)?),
        None => None,
    };

    let logger_provider = config.logs.as_ref().zip(log_exporter).map(|(logs, exporter)| {
        Arc::new(LoggerProvider::new(
            exporter,
            logs.buffer.clone(),
            config.min_severity,
        ))
    });
    let tracer_provider = config
        .traces
        .as_ref()
        .zip(span_exporter)
        .map(|(traces, exporter)| Arc::new(TracerProvider::new(exporter, traces.buffer.clone())));

    let registry = ProviderRegistry::new(logger_provider, tracer_provider);

    let registered_globally = provider::set_global(registry.clone());
    if !registered_globally {
        tracing::warn!("A global telemetry registry is already installed, keeping the existing one");
    }

    let hooks = if Hooks::is_installed(config.hooks) {
        Some(Hooks::new(
            config.hooks,
            &registry,
            ExportPathFilter::new(export_paths),
        ))
    } else {
        None
    };

    Ok(Active {
        registry,
        hooks,
        registered_globally,
    })
}
