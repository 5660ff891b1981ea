use std::sync::Arc;

use airwatch_events::BroadcastHub;
use airwatch_monitor::SensorPoller;
use airwatch_registry::JsonRegistry;
use airwatch_tasmota::{NetworkScanner, Prober, ScanError, SubnetDetector};

use crate::config::{MonitorConfig, ServerConfig};
use crate::live::LiveSnapshot;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Sensor list and dashboard preferences.
    pub registry: Arc<JsonRegistry>,
    /// Live viewers (WebSocket clients).
    pub hub: Arc<BroadcastHub>,
    pub poller: Arc<SensorPoller>,
    pub scanner: Arc<NetworkScanner>,
}

/// Invalid monitor settings detected while wiring the services.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid TUNNEL_INTERFACE_PATTERN: {0}")]
    TunnelPattern(String),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl AppState {
    /// Wire the poller, hub and scanner around `registry`, all probing
    /// through `prober`. The poller is created stopped.
    pub fn new(
        config: ServerConfig,
        monitor: &MonitorConfig,
        registry: Arc<JsonRegistry>,
        prober: Arc<dyn Prober>,
    ) -> Result<Self, StartupError> {
        let poller = Arc::new(SensorPoller::new(
            registry.clone(),
            Arc::clone(&prober),
            monitor.poller_config(),
        ));

        let snapshot = LiveSnapshot::new(Arc::clone(&registry), Arc::clone(&poller));
        let hub = Arc::new(BroadcastHub::new(Arc::new(snapshot)));

        let detector = SubnetDetector::new(&monitor.tunnel_interface_pattern)
            .map_err(|e| StartupError::TunnelPattern(e.to_string()))?;
        let scanner = Arc::new(NetworkScanner::new(prober, detector, monitor.scan_config())?);

        Ok(Self {
            config: Arc::new(config),
            registry,
            hub,
            poller,
            scanner,
        })
    }
}
