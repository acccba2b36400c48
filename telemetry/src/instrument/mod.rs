//! Automatic instrumentation hooks.
//!
//! Hooks observe HTTP traffic and emit spans without caller involvement:
//! a server hook around inbound requests, a router hook around handler
//! dispatch, and a client hook around outbound requests. Outbound calls to
//! the pipeline's own export endpoints are excluded, so exporting telemetry
//! never generates telemetry about itself.

pub mod client;
pub mod server;

pub use client::TracedClient;
pub use server::{trace_router, trace_server, RouterHook, ServerHook};

use crate::error::TelemetryError;
use crate::provider::{ProviderRegistry, Tracer};
use axum::middleware;
use axum::Router;
use std::sync::Arc;

/// Which hooks to install.
///
/// Hooks are independently enable-able, with one layering invariant:
/// router-layer tracing requires the HTTP server hook, because router spans
/// nest inside server spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookConfig {
    /// Trace inbound HTTP server requests.
    pub trace_server: bool,
    /// Trace routing-layer dispatch (requires `trace_server`).
    pub trace_router: bool,
    /// Trace outbound HTTP client requests.
    pub trace_client: bool,
}

impl HookConfig {
    /// Enables every hook.
    #[must_use]
    pub fn all() -> Self {
        Self {
            trace_server: true,
            trace_router: true,
            trace_client: true,
        }
    }

    /// Validates the hook combination.
    ///
    /// # Errors
    ///
    /// Returns an error if router tracing is enabled without the server
    /// hook.
    pub fn validate(self) -> Result<(), TelemetryError> {
        if self.trace_router && !self.trace_server {
            return Err(TelemetryError::RouterHookWithoutServerHook);
        }
        Ok(())
    }

    fn any_enabled(self) -> bool {
        self.trace_server || self.trace_router || self.trace_client
    }
}

/// Suppresses spans for the pipeline's own export traffic.
///
/// Holds the path portions of the configured export endpoints; an outbound
/// request whose path contains any of them is never wrapped in a span.
/// Without this, exporting a span about an export call would enqueue
/// another span, recursing forever.
#[derive(Debug, Clone, Default)]
pub struct ExportPathFilter {
    paths: Vec<String>,
}

impl ExportPathFilter {
    /// Creates a filter over the given endpoint paths.
    #[must_use]
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    /// Whether the given request path targets an export endpoint.
    #[must_use]
    pub fn is_export_path(&self, path: &str) -> bool {
        self.paths.iter().any(|p| path.contains(p.as_str()))
    }
}

/// The installed hook set for a running pipeline.
///
/// Built by the bootstrap at `start` with tracers injected from the
/// pipeline's own registry, rather than discovered through the global slot.
#[derive(Clone)]
pub struct Hooks {
    config: HookConfig,
    server: ServerHook,
    router: RouterHook,
    client_tracer: Tracer,
    filter: Arc<ExportPathFilter>,
}

impl Hooks {
    pub(crate) fn new(
        config: HookConfig,
        registry: &ProviderRegistry,
        filter: ExportPathFilter,
    ) -> Self {
        Self {
            config,
            server: ServerHook::new(registry.tracer("http")),
            router: RouterHook::new(registry.tracer("router")),
            client_tracer: registry.tracer("http_client"),
            filter: Arc::new(filter),
        }
    }

    /// The hook combination this set was installed with.
    #[must_use]
    pub fn config(&self) -> HookConfig {
        self.config
    }

    /// Wraps a router with the enabled inbound hooks.
    ///
    /// The server hook is layered outermost so router spans nest inside
    /// HTTP spans.
    #[must_use]
    pub fn apply(&self, mut router: Router) -> Router {
        if self.config.trace_router {
            router = router.layer(middleware::from_fn_with_state(
                self.router.clone(),
                trace_router,
            ));
        }
        if self.config.trace_server {
            router = router.layer(middleware::from_fn_with_state(
                self.server.clone(),
                trace_server,
            ));
        }
        router
    }

    /// Wraps an HTTP client with the outbound hook.
    ///
    /// Requests to the pipeline's own export endpoints pass through
    /// untraced. When the client hook is disabled the wrapper traces
    /// nothing.
    #[must_use]
    pub fn traced_client(&self, client: reqwest::Client) -> TracedClient {
        let tracer = if self.config.trace_client {
            self.client_tracer.clone()
        } else {
            Tracer::noop(self.client_tracer.scope())
        };
        TracedClient::new(client, tracer, Arc::clone(&self.filter))
    }

    pub(crate) fn is_installed(config: HookConfig) -> bool {
        config.any_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_hook_requires_server_hook() {
        let config = HookConfig {
            trace_router: true,
            ..HookConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TelemetryError::RouterHookWithoutServerHook)
        ));

        assert!(HookConfig::all().validate().is_ok());
        assert!(HookConfig::default().validate().is_ok());
    }

    #[test]
    fn test_filter_matches_configured_paths() {
        let filter = ExportPathFilter::new(vec![
            "/otel/v1/logs".to_string(),
            "/otel/v1/traces".to_string(),
        ]);

        assert!(filter.is_export_path("/otel/v1/logs"));
        assert!(filter.is_export_path("/otel/v1/traces"));
        // Substring match, as the endpoints may sit behind a prefix.
        assert!(filter.is_export_path("/proxy/otel/v1/logs"));
        assert!(!filter.is_export_path("/roll"));
        assert!(!filter.is_export_path("/otel/v1/metrics"));
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = ExportPathFilter::default();
        assert!(!filter.is_export_path("/otel/v1/logs"));
    }
}
