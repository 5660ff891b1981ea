use axum::routing::{get, post};
use axum::Router;

use crate::handlers::monitor;
use crate::state::AppState;

/// Live status routes, merged at the API root.
///
/// ```text
/// GET  /status  -> get_status
/// POST /poll    -> poll_now
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(monitor::get_status))
        .route("/poll", post(monitor::poll_now))
}
