use axum::routing::post;
use axum::Router;

use crate::handlers::scan;
use crate::state::AppState;

/// `POST /scan` -> scan_network (SSE stream)
pub fn router() -> Router<AppState> {
    Router::new().route("/scan", post(scan::scan_network))
}
