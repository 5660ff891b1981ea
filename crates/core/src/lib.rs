//! Airwatch domain types shared by every crate in the workspace.
//!
//! Sensors, particulate readings, per-sensor status, user preferences, the
//! read-only registry seam consumed by the poller, and the WebSocket
//! message type discriminators.

pub mod error;
pub mod messages;
pub mod preferences;
pub mod reading;
pub mod registry;
pub mod sensor;
pub mod status;
pub mod types;
