//! Inbound HTTP instrumentation.
//!
//! Two axum middlewares: [`trace_server`] starts a span per inbound request
//! and exposes its context to inner layers through request extensions;
//! [`trace_router`] starts a child span around handler dispatch, tagged
//! with the matched route.

use crate::models::SpanContext;
use crate::provider::Tracer;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

/// State for the server-level middleware.
#[derive(Clone)]
pub struct ServerHook {
    tracer: Tracer,
}

impl ServerHook {
    /// Creates the hook with the tracer it should emit through.
    #[must_use]
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }
}

/// State for the router-level middleware.
#[derive(Clone)]
pub struct RouterHook {
    tracer: Tracer,
}

impl RouterHook {
    /// Creates the hook with the tracer it should emit through.
    #[must_use]
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }
}

/// Middleware wrapping each inbound request in a server span.
pub async fn trace_server(
    State(hook): State<ServerHook>,
    mut request: Request,
    next: Next,
) -> Response {
    if !hook.tracer.enabled() {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut span = hook.tracer.start_span(format!("{method} {path}"));
    span.set_attribute("http.request.method", method.as_str());
    span.set_attribute("url.path", path);

    // Expose the server span to inner layers for parenting.
    request.extensions_mut().insert(span.context().clone());

    let response = next.run(request).await;
    span.set_attribute("http.response.status_code", response.status().as_u16());
    span.end();
    response
}

/// Middleware wrapping handler dispatch in a child span.
///
/// The parent is the server span's context from the request extensions;
/// the span carries the matched route pattern rather than the raw path.
pub async fn trace_router(
    State(hook): State<RouterHook>,
    request: Request,
    next: Next,
) -> Response {
    if !hook.tracer.enabled() {
        return next.run(request).await;
    }

    let parent = request.extensions().get::<SpanContext>().cloned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |m| m.as_str().to_string());

    let mut span = hook
        .tracer
        .start_span_with_parent(format!("route {route}"), parent.as_ref());
    span.set_attribute("http.route", route);

    let response = next.run(request).await;
    span.set_attribute("http.response.status_code", response.status().as_u16());
    span.end();
    response
}
