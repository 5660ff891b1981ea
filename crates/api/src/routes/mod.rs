pub mod health;
pub mod monitor;
pub mod preferences;
pub mod scan;
pub mod sensors;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                      WebSocket (live updates)
///
/// /sensors                 list, create
/// /sensors/{id}            get, update, delete
///
/// /preferences             get, update
///
/// /status                  last poll reports (GET)
/// /poll                    poll now (POST)
///
/// /scan                    network scan, SSE stream (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/sensors", sensors::router())
        .nest("/preferences", preferences::router())
        .merge(monitor::router())
        .merge(scan::router())
}
