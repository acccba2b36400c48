//! Integration tests for the demo service wired to a full pipeline.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use telemetry::bootstrap::{Telemetry, TelemetryState};
use telemetry::config::{LogsConfig, TelemetryConfig, TracesConfig};
use telemetry::export::{InMemoryLogExporter, InMemorySpanExporter};
use telemetry::instrument::HookConfig;
use telemetry::resource::Resource;
use tower::ServiceExt;

#[tokio::test]
async fn test_roll_request_produces_record_and_nested_spans() {
    let logs = InMemoryLogExporter::new();
    let spans = InMemorySpanExporter::new();

    let pipeline = Telemetry::new();
    pipeline
        .start(
            TelemetryConfig::new(Resource::basic(
                "demo-app",
                "demo-app-rust",
                "aws",
                "eu-west-1",
                "test",
            ))
            .with_logs(LogsConfig::custom(Arc::new(logs.clone())))
            .with_traces(TracesConfig::custom(Arc::new(spans.clone())))
            .with_hooks(HookConfig::all()),
        )
        .await
        .unwrap();

    let state = app::AppState::new(pipeline.registry().logger("demo_app"));
    let mut router = app::create_router(state);
    if let Some(hooks) = pipeline.hooks() {
        router = hooks.apply(router);
    }

    let response = router
        .oneshot(Request::builder().uri("/roll").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let roll: u32 = String::from_utf8(body.to_vec()).unwrap().parse().unwrap();
    assert!((1..100).contains(&roll));

    assert!(pipeline.force_flush().await);

    // One record from the handler.
    let records = logs.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].body, format!("Sending back: {roll}"));

    // One server span and one router span nested inside it.
    let exported = spans.records();
    assert_eq!(exported.len(), 2);
    let server_span = exported.iter().find(|s| s.scope == "http").unwrap();
    let router_span = exported.iter().find(|s| s.scope == "router").unwrap();
    assert_eq!(server_span.name, "GET /roll");
    assert_eq!(
        router_span.parent_span_id.as_deref(),
        Some(server_span.span_id.as_str())
    );
    assert_eq!(
        router_span.attributes.get("http.route"),
        Some(&serde_json::json!("/roll"))
    );

    pipeline.stop().await;
    assert_eq!(pipeline.state(), TelemetryState::Stopped);
}
