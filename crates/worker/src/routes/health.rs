use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether records are being persisted.
    pub storage_configured: bool,
    /// Whether critical alerts are being delivered.
    pub webhook_configured: bool,
}

/// GET /health -- returns service status and which outputs are active.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage_configured: state.runner.publisher().is_configured(),
        webhook_configured: state.runner.notifier().is_configured(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
