//! Messages pushed to live subscribers.

use serde::{Deserialize, Serialize};

use airwatch_core::preferences::Preferences;
use airwatch_core::sensor::Sensor;
use airwatch_core::status::SensorReport;
use airwatch_core::types::SensorId;

/// Envelope for everything the hub distributes.
///
/// Serialized with an internal `type` tag whose values match the
/// `MSG_TYPE_*` constants in [`airwatch_core::messages`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubMessage {
    /// Full current state, sent once right after subscribing.
    Init {
        sensors: Vec<Sensor>,
        preferences: Preferences,
        /// Reports from the last completed poll cycle (empty before the first).
        statuses: Vec<SensorReport>,
    },
    /// One complete poll cycle.
    SensorData { data: Vec<SensorReport> },
    SensorAdded { sensor: Sensor },
    SensorUpdated { sensor: Sensor },
    SensorDeleted { id: SensorId },
    PreferencesUpdated { preferences: Preferences },
    /// A running network scan settled another batch.
    ScanProgress {
        scanned: usize,
        total: usize,
        subnet: String,
    },
}

impl HubMessage {
    /// The `type` discriminator this message serializes with.
    pub fn kind(&self) -> &'static str {
        use airwatch_core::messages::*;

        match self {
            HubMessage::Init { .. } => MSG_TYPE_INIT,
            HubMessage::SensorData { .. } => MSG_TYPE_SENSOR_DATA,
            HubMessage::SensorAdded { .. } => MSG_TYPE_SENSOR_ADDED,
            HubMessage::SensorUpdated { .. } => MSG_TYPE_SENSOR_UPDATED,
            HubMessage::SensorDeleted { .. } => MSG_TYPE_SENSOR_DELETED,
            HubMessage::PreferencesUpdated { .. } => MSG_TYPE_PREFERENCES_UPDATED,
            HubMessage::ScanProgress { .. } => MSG_TYPE_HUB_SCAN_PROGRESS,
        }
    }
}
