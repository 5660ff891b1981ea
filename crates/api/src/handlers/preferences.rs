use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use airwatch_core::preferences::PreferencesPatch;
use airwatch_events::HubMessage;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/preferences
pub async fn get_preferences(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.registry.preferences().await,
    }))
}

/// PUT /api/v1/preferences
///
/// Shallow merge: only the fields present in the body are replaced.
pub async fn update_preferences(
    State(state): State<AppState>,
    patch: Result<Json<PreferencesPatch>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(patch) = patch?;
    let preferences = state.registry.update_preferences(patch).await?;

    tracing::info!(
        cards = preferences.card_order.len(),
        toggles = preferences.metric_toggles.len(),
        "Preferences updated",
    );
    state
        .hub
        .publish(&HubMessage::PreferencesUpdated {
            preferences: preferences.clone(),
        })
        .await;

    Ok(Json(DataResponse { data: preferences }))
}
