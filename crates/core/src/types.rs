/// Sensor identifiers are assigned sequentially by the registry.
pub type SensorId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
