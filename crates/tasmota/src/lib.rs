//! Tasmota PMS5003 device client and LAN discovery.
//!
//! - [`probe`]: one bounded-timeout status request against one address,
//!   normalized into a [`ProbeResult`](airwatch_core::status::ProbeResult)
//!   that never fails.
//! - [`subnet`]: local /24 prefixes worth scanning.
//! - [`scanner`]: sequential batches of concurrent probes across every
//!   host of every subnet, with cumulative progress reporting.

pub mod probe;
pub mod scanner;
pub mod subnet;

pub use probe::{DeviceProbe, ProbeFailure, Prober};
pub use scanner::{DiscoveredDevice, NetworkScanner, ScanConfig, ScanError, ScanProgress, ScanRunResult};
pub use subnet::SubnetDetector;
