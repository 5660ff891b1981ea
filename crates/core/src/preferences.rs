//! Dashboard preferences stored next to the sensor list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::SensorId;

/// Metric name → whether the metric is plotted, for one sensor card.
pub type MetricToggles = BTreeMap<String, bool>;

/// Viewer preferences shared by every connected dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Sensor ids in the order their cards are shown.
    #[serde(default)]
    pub card_order: Vec<SensorId>,
    /// Per-sensor metric visibility. JSON object keys are the sensor ids.
    #[serde(default)]
    pub metric_toggles: BTreeMap<SensorId, MetricToggles>,
}

/// Partial preferences update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub card_order: Option<Vec<SensorId>>,
    pub metric_toggles: Option<BTreeMap<SensorId, MetricToggles>>,
}

impl Preferences {
    /// Shallow merge: each field present in `patch` replaces the stored one.
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(order) = patch.card_order {
            self.card_order = order;
        }
        if let Some(toggles) = patch.metric_toggles {
            self.metric_toggles = toggles;
        }
    }

    /// Drop everything stored for a removed sensor.
    pub fn forget_sensor(&mut self, id: SensorId) {
        self.card_order.retain(|&card| card != id);
        self.metric_toggles.remove(&id);
    }
}
