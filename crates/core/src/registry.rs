//! Read-only view of the sensor registry used by the poller.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::sensor::Sensor;

/// Source of the current sensor list.
///
/// The poller reads through this trait at the start of every cycle, so any
/// store (file, database, in-memory fixture) can back it.
#[async_trait]
pub trait SensorRegistry: Send + Sync {
    async fn list(&self) -> Result<Vec<Sensor>, CoreError>;
}

/// Fixed in-memory registry. Handy for tests and one-off tools.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    sensors: Vec<Sensor>,
}

impl StaticRegistry {
    pub fn new(sensors: Vec<Sensor>) -> Self {
        Self { sensors }
    }
}

#[async_trait]
impl SensorRegistry for StaticRegistry {
    async fn list(&self) -> Result<Vec<Sensor>, CoreError> {
        Ok(self.sensors.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn static_registry_returns_its_sensors() {
        let sensor = Sensor {
            id: 1,
            name: "Hall".into(),
            address: "10.0.0.5".into(),
            created_at: Utc::now(),
        };
        let registry: Arc<dyn SensorRegistry> =
            Arc::new(StaticRegistry::new(vec![sensor.clone()]));

        let listed = registry.list().await.unwrap();
        assert_eq!(listed, vec![sensor]);
    }
}
