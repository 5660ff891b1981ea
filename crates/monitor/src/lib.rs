//! Periodic polling of registered sensors.
//!
//! [`SensorPoller`] probes every sensor of a [`SensorRegistry`] on a fixed
//! interval, keeps the last known [`SensorStatus`] per sensor and hands each
//! completed cycle to a [`PollResultHandler`].
//!
//! [`SensorRegistry`]: airwatch_core::registry::SensorRegistry
//! [`SensorStatus`]: airwatch_core::status::SensorStatus

pub mod error;
pub mod poller;

pub use error::MonitorError;
pub use poller::{PollResultHandler, PollerConfig, SensorPoller};
