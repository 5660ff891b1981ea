use airwatch_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Poll interval must be greater than zero")]
    InvalidInterval,

    #[error("Sensor registry unavailable: {0}")]
    Registry(#[from] CoreError),
}
