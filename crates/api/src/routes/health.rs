use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::config::BUILD_NUMBER;
use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub build_number: &'static str,
    /// Identifier of this process's work queue.
    pub queue_id: String,
    /// Jobs currently waiting for the worker.
    pub queue_length: usize,
}

/// GET /health -- returns service status and backlog size.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let queue = state.dispatcher.queue();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        build_number: BUILD_NUMBER,
        queue_id: queue.id().to_string(),
        queue_length: queue.len(),
    })
}

/// Mount health check routes. No authentication.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
