//! Lightbeam Demo Service Binary
//!
//! Entry point for the demo dice-roll service with batched telemetry
//! export.

#![deny(unsafe_code)]

use anyhow::Result;
use clap::Parser;

/// Demo dice-roll service with batched telemetry export
#[derive(Parser)]
#[command(name = "demo-app")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = app::Config::from_env()?;
    config.port = args.port;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if config.debug { "debug" } else { "info" })
            }),
        )
        .init();

    app::run_server_with_config(config).await
}
