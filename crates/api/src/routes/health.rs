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
    /// Whether the registry document is readable.
    pub registry_healthy: bool,
    /// Whether the background poll loop is running.
    pub poller_running: bool,
}

/// GET /health -- returns service and registry health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry_healthy = state.registry.health_check().await.is_ok();
    let poller_running = state.poller.is_running().await;

    let status = if registry_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        registry_healthy,
        poller_running,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
