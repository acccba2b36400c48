//! Outbound HTTP instrumentation.
//!
//! [`TracedClient`] wraps a `reqwest::Client` and emits a client span per
//! request. Requests whose path matches the pipeline's own export endpoints
//! are passed through untraced.

use crate::instrument::ExportPathFilter;
use crate::provider::Tracer;
use std::sync::Arc;

/// HTTP client wrapper emitting a span per outbound request.
#[derive(Clone)]
pub struct TracedClient {
    client: reqwest::Client,
    tracer: Tracer,
    filter: Arc<ExportPathFilter>,
}

impl TracedClient {
    /// Wraps a client with the given tracer and export-path filter.
    #[must_use]
    pub fn new(client: reqwest::Client, tracer: Tracer, filter: Arc<ExportPathFilter>) -> Self {
        Self {
            client,
            tracer,
            filter,
        }
    }

    /// The wrapped client, for requests that should bypass tracing.
    #[must_use]
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Whether a request to the given URL would be wrapped in a span.
    #[must_use]
    pub fn should_trace(&self, url: &reqwest::Url) -> bool {
        self.tracer.enabled() && !self.filter.is_export_path(url.path())
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns the underlying transport error; the span (if any) records
    /// the failure before this returns.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let request = self.client.get(url).build()?;
        self.execute(request).await
    }

    /// Sends a request, wrapping it in a client span unless its path
    /// targets an export endpoint.
    ///
    /// # Errors
    ///
    /// Returns the underlying transport error.
    pub async fn execute(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        if !self.should_trace(request.url()) {
            return self.client.execute(request).await;
        }

        let method = request.method().clone();
        let path = request.url().path().to_string();

        let mut span = self.tracer.start_span(format!("{method} {path}"));
        span.set_attribute("http.request.method", method.as_str());
        span.set_attribute("url.full", request.url().as_str());

        let result = self.client.execute(request).await;
        match &result {
            Ok(response) => {
                span.set_attribute("http.response.status_code", response.status().as_u16());
            }
            Err(error) => {
                span.set_attribute("error.message", error.to_string());
            }
        }
        span.end();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(paths: Vec<String>, tracer: Tracer) -> TracedClient {
        TracedClient::new(
            reqwest::Client::new(),
            tracer,
            Arc::new(ExportPathFilter::new(paths)),
        )
    }

    #[test]
    fn test_export_paths_are_not_traced() {
        let traced = client(
            vec!["/otel/v1/logs".to_string(), "/otel/v1/traces".to_string()],
            Tracer::noop("http_client"),
        );

        // Tracer disabled: nothing is traced regardless of path.
        let url = reqwest::Url::parse("http://collector:4318/otel/v1/logs").unwrap();
        assert!(!traced.should_trace(&url));
    }

    #[tokio::test]
    async fn test_should_trace_depends_on_path() {
        use crate::config::BufferConfig;
        use crate::export::InMemorySpanExporter;
        use crate::provider::TracerProvider;

        let provider = Arc::new(TracerProvider::new(
            Arc::new(InMemorySpanExporter::new()),
            BufferConfig::default(),
        ));
        let traced = client(
            vec!["/otel/v1/logs".to_string()],
            provider.tracer("http_client"),
        );

        let export_url = reqwest::Url::parse("http://collector:4318/otel/v1/logs").unwrap();
        let other_url = reqwest::Url::parse("http://api.example.com/users").unwrap();

        assert!(!traced.should_trace(&export_url));
        assert!(traced.should_trace(&other_url));

        provider.shutdown().await;
    }
}
