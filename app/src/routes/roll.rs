//! Dice-roll endpoint.
//!
//! The demo's single piece of business logic: returns a random number and
//! emits one log record per request through the telemetry pipeline.

use crate::state::AppState;
use axum::{extract::State, routing::get, Router};
use rand::Rng;
use telemetry::models::{LogRecord, Severity};

/// Creates the dice-roll routes.
pub fn roll_routes(state: AppState) -> Router {
    Router::new().route("/roll", get(roll)).with_state(state)
}

/// Handler returning a random number between 1 and 99.
async fn roll(State(state): State<AppState>) -> String {
    let roll = rand::thread_rng().gen_range(1..100u32).to_string();

    state.logger().emit(
        LogRecord::new(Severity::Info, format!("Sending back: {roll}"))
            .with_attribute("path", "/roll")
            .with_attribute("roll", roll.as_str()),
    );

    roll
}
