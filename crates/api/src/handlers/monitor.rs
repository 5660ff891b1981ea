//! Read and refresh live sensor status.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use airwatch_events::HubMessage;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/status
///
/// Reports of the last completed poll cycle; empty until the first one.
pub async fn get_status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.poller.reports().await,
    }))
}

/// POST /api/v1/poll
///
/// Run one poll cycle immediately, broadcast it and return it.
pub async fn poll_now(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let reports = state.poller.poll_once().await?;

    state
        .hub
        .publish(&HubMessage::SensorData {
            data: reports.clone(),
        })
        .await;

    Ok(Json(DataResponse { data: reports }))
}
