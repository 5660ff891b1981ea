use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use airwatch_core::error::CoreError;
use airwatch_monitor::MonitorError;
use airwatch_registry::RegistryError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and the service errors, plus malformed-request rejections.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `airwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure of the registry store.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A failure of an on-demand poll.
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Registry(RegistryError::Core(core)) => classify_core_error(core),
            AppError::Registry(err) => {
                tracing::error!(error = %err, "Registry error");
                internal()
            }

            AppError::Monitor(MonitorError::Registry(core)) => classify_core_error(core),
            AppError::Monitor(err) => {
                tracing::error!(error = %err, "Poller error");
                internal()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn registry_validation_is_bad_request() {
        let err = AppError::Registry(RegistryError::Core(CoreError::Validation(
            "Sensor name is required".into(),
        )));
        let (status, json) = render(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"], "Sensor name is required");
    }

    #[tokio::test]
    async fn io_failure_is_sanitized() {
        let err = AppError::Registry(RegistryError::Io(std::io::Error::other("disk full")));
        let (status, json) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn poll_registry_failure_is_sanitized() {
        let err = AppError::Monitor(MonitorError::Registry(CoreError::Internal(
            "registry file unreadable".into(),
        )));
        let (status, json) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn not_found_names_entity() {
        let (status, json) = render(AppError::Core(CoreError::NotFound {
            entity: "Sensor",
            id: 4,
        }))
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Sensor with id 4 not found");
    }
}
