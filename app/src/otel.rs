//! Telemetry wiring for the demo service.
//!
//! Translates the service [`Config`] into a pipeline configuration: HTTP
//! exporters with basic auth, the standard resource identity, a 5 second
//! flush interval, and all instrumentation hooks enabled.

use crate::config::Config;
use std::time::Duration;
use telemetry::config::{
    BufferConfig, Compression, ExporterConfig, LogsConfig, TelemetryConfig, TracesConfig,
};
use telemetry::instrument::HookConfig;
use telemetry::models::Severity;
use telemetry::resource::{semconv, Resource};

/// Interval between scheduled telemetry flushes.
const TELEMETRY_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

fn exporter(url: &str, config: &Config) -> ExporterConfig {
    let mut exporter = ExporterConfig::new(url);
    if let (Some(username), Some(password)) = (&config.auth_username, &config.auth_password) {
        exporter = exporter.with_basic_auth(username, password);
    }
    exporter
}

/// Builds the pipeline configuration for this service.
pub fn telemetry_config(config: &Config) -> TelemetryConfig {
    let resource = Resource::basic("demo-app", "demo-app-rust", "aws", "eu-west-1", &config.stage)
        .with_attribute(semconv::CLOUD_PLATFORM, "aws_ecs");

    let buffer = BufferConfig::default().with_scheduled_delay(TELEMETRY_FLUSH_INTERVAL);

    let mut telemetry_config = TelemetryConfig::new(resource)
        .with_min_severity(if config.debug {
            Severity::Debug
        } else {
            Severity::Info
        })
        .with_hooks(HookConfig::all());

    if let Some(logs_url) = &config.logs_url {
        telemetry_config = telemetry_config
            .with_logs(LogsConfig::http(exporter(logs_url, config)).with_buffer(buffer.clone()));
    }
    if let Some(traces_url) = &config.traces_url {
        // Span payloads are the bulkier signal; gzip them on the wire.
        telemetry_config = telemetry_config.with_traces(
            TracesConfig::http(exporter(traces_url, config).with_compression(Compression::Gzip))
                .with_buffer(buffer),
        );
    }

    telemetry_config
}
