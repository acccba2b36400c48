//! Lightbeam Demo Service
//!
//! A deliberately small HTTP service (`GET /roll` returns a random number)
//! hosting the telemetry pipeline: on boot it starts the pipeline from
//! environment configuration, every request emits a log record and is
//! wrapped in spans by the instrumentation hooks, and on SIGTERM/SIGINT
//! the pipeline is flushed and stopped before the process exits.
//!
//! # Example
//!
//! ```no_run
//! use app::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod otel;
mod routes;
mod state;

pub use config::Config;
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use telemetry::bootstrap::Telemetry;
use telemetry::models::{LogRecord, Severity};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Scope name the service emits its own records under.
const APP_SCOPE: &str = "demo_app";

/// Runs the demo service.
///
/// Loads configuration from environment variables, starts the telemetry
/// pipeline, serves until a termination signal arrives, then flushes and
/// stops the pipeline.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The telemetry configuration is invalid (telemetry is a declared
///   requirement when an endpoint is configured)
/// - The server fails to bind or a fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the demo service with the provided configuration.
///
/// The process exit status reflects the server outcome only: telemetry
/// flush failures at shutdown are logged by the pipeline, never raised.
///
/// # Errors
///
/// Returns an error if the telemetry configuration is invalid, the server
/// fails to bind, or a fatal error occurs during operation.
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let pipeline = Telemetry::new();
    pipeline.start(otel::telemetry_config(&config)).await?;

    let registry = pipeline.registry();
    let logger = registry.logger(APP_SCOPE);

    let mut app = create_router(AppState::new(logger.clone()));
    if let Some(hooks) = pipeline.hooks() {
        app = hooks.apply(app);
    }

    let result = serve(&config, app, &logger).await;

    // Stop the pipeline after the server has drained, whatever the server
    // outcome was.
    pipeline.stop().await;
    result
}

/// Creates the application router with all routes and middleware.
///
/// Public to allow testing the router without starting a full server.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::roll_routes(state))
        .layer(TraceLayer::new_for_http())
}

async fn serve(config: &Config, app: Router, logger: &telemetry::provider::Logger) -> Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for requests");
    logger.emit(
        LogRecord::new(
            Severity::Info,
            format!("Listening for requests on http://{}:{}", config.host, config.port),
        )
        .with_attribute("listening", "port"),
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
