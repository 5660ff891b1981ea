//! Particulate-matter readings reported by PMS5003 sensors.
//!
//! A reading is a bag of metric name → value pairs exactly as the device
//! reported them. The nine metrics viewers care about are listed in
//! [`METRICS`]; any of them may be missing from a given payload and read as
//! zero through [`ParticulateReading::value`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metric names
// ---------------------------------------------------------------------------

/// PM1.0 mass concentration (µg/m³).
pub const METRIC_PM1: &str = "PM1";
/// PM2.5 mass concentration (µg/m³).
pub const METRIC_PM2_5: &str = "PM2.5";
/// PM10 mass concentration (µg/m³).
pub const METRIC_PM10: &str = "PM10";
/// Particles > 0.3 µm per 0.1 L of air.
pub const METRIC_PB0_3: &str = "PB0.3";
/// Particles > 0.5 µm per 0.1 L of air.
pub const METRIC_PB0_5: &str = "PB0.5";
/// Particles > 1.0 µm per 0.1 L of air.
pub const METRIC_PB1: &str = "PB1";
/// Particles > 2.5 µm per 0.1 L of air.
pub const METRIC_PB2_5: &str = "PB2.5";
/// Particles > 5.0 µm per 0.1 L of air.
pub const METRIC_PB5: &str = "PB5";
/// Particles > 10 µm per 0.1 L of air.
pub const METRIC_PB10: &str = "PB10";

/// Every metric the dashboard displays, in display order.
pub const METRICS: &[&str] = &[
    METRIC_PM1,
    METRIC_PM2_5,
    METRIC_PM10,
    METRIC_PB0_3,
    METRIC_PB0_5,
    METRIC_PB1,
    METRIC_PB2_5,
    METRIC_PB5,
    METRIC_PB10,
];

// ---------------------------------------------------------------------------
// ParticulateReading
// ---------------------------------------------------------------------------

/// One set of values read from a sensor.
///
/// Serializes as a flat JSON object (`{"PM2.5": 12, ...}`), the same shape
/// the device uses on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticulateReading(BTreeMap<String, f64>);

impl ParticulateReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reading from the JSON object found under `PMS5003`.
    ///
    /// Non-numeric and negative entries are skipped. Returns `None` when the
    /// value is not a JSON object at all.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let values = object
            .iter()
            .filter_map(|(name, v)| {
                v.as_f64()
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .map(|n| (name.clone(), n))
            })
            .collect();
        Some(Self(values))
    }

    /// Builder-style insert, mostly for tests and the mock device.
    pub fn with(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.0.insert(metric.into(), value);
        self
    }

    /// Value for `metric`, or zero when the device did not report it.
    pub fn value(&self, metric: &str) -> f64 {
        self.0.get(metric).copied().unwrap_or(0.0)
    }

    /// Value for `metric` only if the device reported it.
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.0.get(metric).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_keeps_numeric_fields() {
        let reading = ParticulateReading::from_json(&json!({
            "PM1": 3,
            "PM2.5": 12,
            "PB0.3": 450.5,
            "CF1": 2
        }))
        .expect("object should parse");

        assert_eq!(reading.value(METRIC_PM2_5), 12.0);
        assert_eq!(reading.value(METRIC_PB0_3), 450.5);
        assert_eq!(reading.get("CF1"), Some(2.0));
        assert_eq!(reading.len(), 4);
    }

    #[test]
    fn from_json_skips_negative_and_non_numeric() {
        let reading = ParticulateReading::from_json(&json!({
            "PM1": -1,
            "PM2.5": "twelve",
            "PM10": null,
            "PB1": 7
        }))
        .expect("object should parse");

        assert_eq!(reading.len(), 1);
        assert_eq!(reading.get(METRIC_PB1), Some(7.0));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(ParticulateReading::from_json(&json!([1, 2, 3])).is_none());
        assert!(ParticulateReading::from_json(&json!(12)).is_none());
    }

    #[test]
    fn missing_metrics_read_as_zero() {
        let reading = ParticulateReading::new().with(METRIC_PM2_5, 8.0);

        assert_eq!(reading.value(METRIC_PM10), 0.0);
        assert!(reading.get(METRIC_PM10).is_none());
    }

    #[test]
    fn serializes_as_flat_object() {
        let reading = ParticulateReading::new()
            .with(METRIC_PM2_5, 12.0)
            .with(METRIC_PM10, 20.0);

        let value = serde_json::to_value(&reading).unwrap();
        assert_eq!(value, json!({"PM2.5": 12.0, "PM10": 20.0}));
    }
}
