//! Glue between the services and the broadcast hub.
//!
//! - [`LiveSnapshot`] builds the `init` message a new viewer receives.
//! - [`HubPublisher`] forwards every completed poll cycle as `sensor_data`.

use std::sync::Arc;

use async_trait::async_trait;

use airwatch_core::status::SensorReport;
use airwatch_events::{BroadcastHub, HubMessage, SnapshotProvider};
use airwatch_monitor::{PollResultHandler, SensorPoller};
use airwatch_registry::JsonRegistry;

/// Current sensors, preferences and last poll reports.
pub struct LiveSnapshot {
    registry: Arc<JsonRegistry>,
    poller: Arc<SensorPoller>,
}

impl LiveSnapshot {
    pub fn new(registry: Arc<JsonRegistry>, poller: Arc<SensorPoller>) -> Self {
        Self { registry, poller }
    }
}

#[async_trait]
impl SnapshotProvider for LiveSnapshot {
    async fn snapshot(&self) -> HubMessage {
        HubMessage::Init {
            sensors: self.registry.sensors().await,
            preferences: self.registry.preferences().await,
            statuses: self.poller.reports().await,
        }
    }
}

/// Publishes poll results to every viewer.
pub struct HubPublisher {
    hub: Arc<BroadcastHub>,
}

impl HubPublisher {
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl PollResultHandler for HubPublisher {
    async fn on_result(&self, reports: Vec<SensorReport>) {
        self.hub.publish(&HubMessage::SensorData { data: reports }).await;
    }
}
