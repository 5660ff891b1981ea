use axum::routing::get;
use axum::Router;

use crate::handlers::sensors;
use crate::state::AppState;

/// Sensor routes mounted at `/sensors`.
///
/// ```text
/// GET    /        -> list_sensors
/// POST   /        -> create_sensor
/// GET    /{id}    -> get_sensor
/// PUT    /{id}    -> update_sensor
/// DELETE /{id}    -> delete_sensor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sensors::list_sensors).post(sensors::create_sensor),
        )
        .route(
            "/{id}",
            get(sensors::get_sensor)
                .put(sensors::update_sensor)
                .delete(sensors::delete_sensor),
        )
}
