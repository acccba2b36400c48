//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use telemetry::provider::Logger;

/// Application state shared across all request handlers.
///
/// Holds the scoped logger handle the handlers emit through. The handle is
/// injected at startup from the running pipeline's registry; tests inject
/// a handle backed by an in-memory exporter instead.
#[derive(Clone)]
pub struct AppState {
    logger: Logger,
}

impl AppState {
    /// Creates the application state with the given logger handle.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Returns the logger handle for emitting request records.
    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Logger::noop("demo_app"))
    }
}
