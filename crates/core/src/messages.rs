//! WebSocket and Server-Sent Events message type discriminators.
//!
//! Every frame pushed to a viewer is a JSON object whose `type` field is one
//! of these constants. The hub message enum and the scan stream both
//! serialize to these names.

/// Full state snapshot sent to a subscriber right after it connects.
pub const MSG_TYPE_INIT: &str = "init";

/// Result of one complete poll cycle.
pub const MSG_TYPE_SENSOR_DATA: &str = "sensor_data";

pub const MSG_TYPE_SENSOR_ADDED: &str = "sensor_added";
pub const MSG_TYPE_SENSOR_UPDATED: &str = "sensor_updated";
pub const MSG_TYPE_SENSOR_DELETED: &str = "sensor_deleted";
pub const MSG_TYPE_PREFERENCES_UPDATED: &str = "preferences_updated";

/// Scan progress mirrored to every live viewer, one per completed batch.
pub const MSG_TYPE_HUB_SCAN_PROGRESS: &str = "scan_progress";

/// Scan stream: one per completed batch.
pub const MSG_TYPE_SCAN_PROGRESS: &str = "progress";

/// Scan stream: final event carrying every discovered device.
pub const MSG_TYPE_SCAN_COMPLETE: &str = "complete";

/// Scan stream: the scan could not run.
pub const MSG_TYPE_SCAN_ERROR: &str = "error";
