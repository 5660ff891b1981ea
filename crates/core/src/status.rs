//! Probe outcomes and the per-sensor status derived from them.

use serde::{Deserialize, Serialize};

use crate::reading::ParticulateReading;
use crate::sensor::Sensor;
use crate::types::{SensorId, Timestamp};

/// Outcome of a single probe against one address.
///
/// Either `found` with a reading, or not found with a reason. Constructed
/// only through [`ProbeResult::found`] and [`ProbeResult::not_found`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    found: bool,
    reading: Option<ParticulateReading>,
    error: Option<String>,
}

impl ProbeResult {
    pub fn found(reading: ParticulateReading) -> Self {
        Self {
            found: true,
            reading: Some(reading),
            error: None,
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            found: false,
            reading: None,
            error: Some(reason.into()),
        }
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn reading(&self) -> Option<&ParticulateReading> {
        self.reading.as_ref()
    }

    /// Reason the device was not found.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_reading(self) -> Option<ParticulateReading> {
        self.reading
    }
}

/// Last known state of one sensor, replaced wholesale every poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStatus {
    pub online: bool,
    pub reading: Option<ParticulateReading>,
    pub observed_at: Timestamp,
    pub error: Option<String>,
}

impl SensorStatus {
    /// Classify a probe result observed at `observed_at`.
    pub fn from_probe(result: ProbeResult, observed_at: Timestamp) -> Self {
        Self {
            online: result.found,
            reading: result.reading,
            observed_at,
            error: result.error,
        }
    }
}

/// One entry of a poll cycle's published result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    pub id: SensorId,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub status: SensorStatus,
}

impl SensorReport {
    pub fn new(sensor: &Sensor, status: SensorStatus) -> Self {
        Self {
            id: sensor.id,
            name: sensor.name.clone(),
            address: sensor.address.clone(),
            status,
        }
    }
}
