//! Providers and the process-wide registry.
//!
//! A [`LoggerProvider`] and [`TracerProvider`] own their signal's batch
//! processor; application code obtains cheap [`Logger`]/[`Tracer`] handles
//! through a [`ProviderRegistry`]. The bootstrap owns the registry and
//! injects it where it can; a single global slot remains for call sites
//! that cannot be threaded a reference, such as instrumentation installed
//! independently of request-handling code.

pub mod logger;
pub mod tracer;

pub use logger::{Logger, LoggerProvider};
pub use tracer::{Span, Tracer, TracerProvider};

use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

/// Scope used when the caller does not supply one.
pub const DEFAULT_SCOPE: &str = "default";

/// Normalizes a caller-supplied scope name; empty means [`DEFAULT_SCOPE`].
pub(crate) fn scope_or_default(scope: &str) -> Arc<str> {
    if scope.is_empty() {
        Arc::from(DEFAULT_SCOPE)
    } else {
        Arc::from(scope)
    }
}

/// The active logger/tracer binding for a pipeline.
///
/// Holds at most one provider per signal. A registry with a signal missing
/// hands out no-op handles for it, so callers never need to special-case
/// disabled telemetry.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    logger_provider: Option<Arc<LoggerProvider>>,
    tracer_provider: Option<Arc<TracerProvider>>,
}

impl ProviderRegistry {
    /// Creates a registry over the given providers.
    #[must_use]
    pub fn new(
        logger_provider: Option<Arc<LoggerProvider>>,
        tracer_provider: Option<Arc<TracerProvider>>,
    ) -> Self {
        Self {
            logger_provider,
            tracer_provider,
        }
    }

    /// Returns a logger handle bound to the given scope name.
    ///
    /// An empty scope falls back to [`DEFAULT_SCOPE`]. Handles obtained for
    /// the same scope are functionally equivalent.
    #[must_use]
    pub fn logger(&self, scope: &str) -> Logger {
        match &self.logger_provider {
            Some(provider) => provider.logger(scope),
            None => Logger::noop(scope),
        }
    }

    /// Returns a tracer handle bound to the given scope name.
    #[must_use]
    pub fn tracer(&self, scope: &str) -> Tracer {
        match &self.tracer_provider {
            Some(provider) => provider.tracer(scope),
            None => Tracer::noop(scope),
        }
    }

    /// The active logger provider, if the logs signal is enabled.
    #[must_use]
    pub fn logger_provider(&self) -> Option<&Arc<LoggerProvider>> {
        self.logger_provider.as_ref()
    }

    /// The active tracer provider, if the traces signal is enabled.
    #[must_use]
    pub fn tracer_provider(&self) -> Option<&Arc<TracerProvider>> {
        self.tracer_provider.as_ref()
    }
}

/// The process-wide active registry.
///
/// Write-once-then-read-many per pipeline lifecycle: set at `start`,
/// cleared at `stop`.
static GLOBAL_REGISTRY: Lazy<RwLock<Option<ProviderRegistry>>> = Lazy::new(|| RwLock::new(None));

/// Installs the registry as the process-wide active one.
///
/// First registration wins: returns `false` without replacing if a registry
/// is already installed.
pub(crate) fn set_global(registry: ProviderRegistry) -> bool {
    match GLOBAL_REGISTRY.write() {
        Ok(mut slot) => {
            if slot.is_some() {
                return false;
            }
            *slot = Some(registry);
            true
        }
        Err(_) => false,
    }
}

/// Removes the process-wide active registry.
pub(crate) fn clear_global() {
    if let Ok(mut slot) = GLOBAL_REGISTRY.write() {
        *slot = None;
    }
}

/// Returns a logger handle from the process-wide active registry.
///
/// Defaults to the `"default"` scope. Yields a no-op handle when no
/// pipeline is running.
#[must_use]
pub fn global_logger(scope: &str) -> Logger {
    match GLOBAL_REGISTRY.read() {
        Ok(slot) => match slot.as_ref() {
            Some(registry) => registry.logger(scope),
            None => Logger::noop(scope),
        },
        Err(_) => Logger::noop(scope),
    }
}

/// Returns a tracer handle from the process-wide active registry.
///
/// Yields a no-op handle when no pipeline is running.
#[must_use]
pub fn global_tracer(scope: &str) -> Tracer {
    match GLOBAL_REGISTRY.read() {
        Ok(slot) => match slot.as_ref() {
            Some(registry) => registry.tracer(scope),
            None => Tracer::noop(scope),
        },
        Err(_) => Tracer::noop(scope),
    }
}
