//! Pipeline configuration and lifecycle errors.

use thiserror::Error;

/// Errors surfaced by telemetry configuration and bootstrap.
///
/// These are the only errors this crate ever raises to the caller: a
/// configuration problem detected at `start` is fatal by design, while every
/// runtime failure (queue overflow, export failure, shutdown step failure)
/// is logged locally and never propagated into application code.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A configuration struct failed validation.
    #[error("Invalid telemetry configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A buffer tunable was set to zero.
    #[error("Invalid buffer configuration: {0} must be greater than zero")]
    InvalidBufferConfig(&'static str),

    /// A configured export endpoint does not parse as a URL.
    #[error("Invalid export endpoint URL '{url}'")]
    InvalidEndpoint {
        /// The offending endpoint value.
        url: String,
    },

    /// A configured header name or value is not a valid HTTP header.
    #[error("Invalid export header '{name}'")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },

    /// Router-layer tracing was requested without the HTTP server hook.
    ///
    /// Router spans nest inside HTTP server spans, so the server hook must
    /// be enabled whenever the router hook is.
    #[error("Router tracing requires the HTTP server hook to be enabled")]
    RouterHookWithoutServerHook,

    /// The pipeline was already stopped.
    ///
    /// `Stopped` is terminal: a process that needs telemetry again must be
    /// restarted.
    #[error("Telemetry has been stopped and cannot be started again")]
    AlreadyStopped,

    /// The export HTTP client could not be constructed.
    #[error("Failed to build export HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
