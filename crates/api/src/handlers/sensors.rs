//! Sensor registry CRUD.
//!
//! Every successful change is broadcast to live viewers so dashboards stay
//! in sync without polling the API.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use airwatch_core::error::CoreError;
use airwatch_core::sensor::{NewSensor, UpdateSensor};
use airwatch_core::types::SensorId;
use airwatch_events::HubMessage;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: SensorId) -> CoreError {
    CoreError::NotFound {
        entity: "Sensor",
        id,
    }
}

/// GET /api/v1/sensors
pub async fn list_sensors(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let sensors = state.registry.sensors().await;
    Ok(Json(DataResponse { data: sensors }))
}

/// GET /api/v1/sensors/{id}
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(id): Path<SensorId>,
) -> AppResult<impl IntoResponse> {
    let sensor = state.registry.get(id).await.ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: sensor }))
}

/// POST /api/v1/sensors
///
/// Registers a sensor. Rejected when name or address is blank or the
/// registry already holds the maximum number of sensors.
pub async fn create_sensor(
    State(state): State<AppState>,
    input: Result<Json<NewSensor>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let sensor = state.registry.add(input).await?;

    tracing::info!(sensor_id = sensor.id, address = %sensor.address, "Sensor added");
    state
        .hub
        .publish(&HubMessage::SensorAdded {
            sensor: sensor.clone(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: sensor })))
}

/// PUT /api/v1/sensors/{id}
pub async fn update_sensor(
    State(state): State<AppState>,
    Path(id): Path<SensorId>,
    input: Result<Json<UpdateSensor>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let sensor = state
        .registry
        .update(id, input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(sensor_id = id, "Sensor updated");
    state
        .hub
        .publish(&HubMessage::SensorUpdated {
            sensor: sensor.clone(),
        })
        .await;

    Ok(Json(DataResponse { data: sensor }))
}

/// DELETE /api/v1/sensors/{id}
pub async fn delete_sensor(
    State(state): State<AppState>,
    Path(id): Path<SensorId>,
) -> AppResult<impl IntoResponse> {
    if !state.registry.delete(id).await? {
        return Err(not_found(id).into());
    }

    tracing::info!(sensor_id = id, "Sensor deleted");
    state.hub.publish(&HubMessage::SensorDeleted { id }).await;

    Ok(StatusCode::NO_CONTENT)
}
