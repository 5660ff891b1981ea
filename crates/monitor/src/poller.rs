//! The repeating poll loop.
//!
//! Lifecycle: `Stopped --start--> Running --stop--> Stopped`. A running
//! poller polls immediately, then once per interval. Each cycle:
//!
//! 1. reads the sensor list from the registry;
//! 2. probes every sensor concurrently, each with its own timeout;
//! 3. replaces the status map wholesale;
//! 4. hands the full report list to the handler.
//!
//! Cycles never overlap: the next tick waits for the current cycle, and
//! every cycle (looped or on demand) holds the cycle lock from the registry
//! read until the status map is replaced. Step 4
//! runs under a gate that `start`/`stop` also take, so once `stop` returns
//! the handler is not called again, even for a cycle that was mid-flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use airwatch_core::registry::SensorRegistry;
use airwatch_core::status::{SensorReport, SensorStatus};
use airwatch_core::types::SensorId;
use airwatch_tasmota::Prober;

use crate::error::MonitorError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between cycle starts.
    pub interval: Duration,
    /// Per-sensor probe deadline.
    pub request_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Receives every completed cycle of a running poller.
#[async_trait]
pub trait PollResultHandler: Send + Sync {
    async fn on_result(&self, reports: Vec<SensorReport>);
}

/// Result of the most recent completed cycle.
#[derive(Default)]
struct LatestCycle {
    statuses: HashMap<SensorId, SensorStatus>,
    reports: Vec<SensorReport>,
}

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct SensorPoller {
    registry: Arc<dyn SensorRegistry>,
    prober: Arc<dyn Prober>,
    config: PollerConfig,
    latest: RwLock<LatestCycle>,
    running: Mutex<Option<RunningLoop>>,
    cycle_lock: Mutex<()>,
    publish_gate: Mutex<()>,
}

impl SensorPoller {
    pub fn new(
        registry: Arc<dyn SensorRegistry>,
        prober: Arc<dyn Prober>,
        config: PollerConfig,
    ) -> Self {
        Self {
            registry,
            prober,
            config,
            latest: RwLock::new(LatestCycle::default()),
            running: Mutex::new(None),
            cycle_lock: Mutex::new(()),
            publish_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start polling every `interval`, replacing any loop already running.
    pub async fn start(
        self: &Arc<Self>,
        interval: Duration,
        handler: Arc<dyn PollResultHandler>,
    ) -> Result<(), MonitorError> {
        if interval.is_zero() {
            return Err(MonitorError::InvalidInterval);
        }

        let _gate = self.publish_gate.lock().await;
        let mut running = self.running.lock().await;

        if let Some(previous) = running.take() {
            previous.cancel.cancel();
            tracing::info!("Restarting sensor poller");
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(self).run(interval, handler, cancel.clone()));
        *running = Some(RunningLoop { cancel, handle });

        tracing::info!(interval_ms = interval.as_millis() as u64, "Sensor poller started");
        Ok(())
    }

    /// Stop polling. A no-op when already stopped.
    pub async fn stop(&self) {
        // The detached loop exits on its own once it sees the cancellation.
        let _ = self.halt().await;
    }

    /// Stop and wait up to `grace` for the loop task to finish.
    pub async fn shutdown(&self, grace: Duration) {
        if let Some(handle) = self.halt().await {
            if tokio::time::timeout(grace, handle).await.is_err() {
                tracing::warn!("Sensor poller did not stop within grace period");
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    async fn halt(&self) -> Option<JoinHandle<()>> {
        let _gate = self.publish_gate.lock().await;
        let run = self.running.lock().await.take()?;
        run.cancel.cancel();
        tracing::info!("Sensor poller stopped");
        Some(run.handle)
    }

    async fn run(
        self: Arc<Self>,
        interval: Duration,
        handler: Arc<dyn PollResultHandler>,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let reports = match self.poll_once().await {
                        Ok(reports) => reports,
                        Err(e) => {
                            tracing::error!(error = %e, "Poll cycle skipped");
                            continue;
                        }
                    };

                    let _gate = self.publish_gate.lock().await;
                    if cancel.is_cancelled() {
                        tracing::debug!("Poller stopped mid-cycle, result discarded");
                        break;
                    }
                    handler.on_result(reports).await;
                }
            }
        }

        tracing::debug!("Sensor poll loop exited");
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// Run one cycle now and return its reports, in registry order.
    ///
    /// Does not invoke any handler; the caller decides what to do with the
    /// result. Waits for any cycle already in progress to finish first.
    pub async fn poll_once(&self) -> Result<Vec<SensorReport>, MonitorError> {
        let _cycle = self.cycle_lock.lock().await;

        let sensors = self.registry.list().await?;
        let timeout = self.config.request_timeout;

        let probes = sensors.iter().map(|sensor| {
            let prober = Arc::clone(&self.prober);
            async move {
                let result = prober.probe(&sensor.address, timeout).await;
                SensorStatus::from_probe(result, Utc::now())
            }
        });
        let statuses = join_all(probes).await;

        let mut cycle = LatestCycle {
            statuses: HashMap::with_capacity(sensors.len()),
            reports: Vec::with_capacity(sensors.len()),
        };
        for (sensor, status) in sensors.iter().zip(statuses) {
            if !status.online {
                tracing::debug!(
                    sensor_id = sensor.id,
                    address = %sensor.address,
                    reason = status.error.as_deref().unwrap_or_default(),
                    "Sensor offline"
                );
            }
            cycle.reports.push(SensorReport::new(sensor, status.clone()));
            cycle.statuses.insert(sensor.id, status);
        }

        let reports = cycle.reports.clone();
        let online = reports.iter().filter(|r| r.status.online).count();
        *self.latest.write().await = cycle;

        tracing::debug!(sensors = reports.len(), online, "Poll cycle complete");
        Ok(reports)
    }

    /// Last completed status map.
    pub async fn statuses(&self) -> HashMap<SensorId, SensorStatus> {
        self.latest.read().await.statuses.clone()
    }

    pub async fn status(&self, id: SensorId) -> Option<SensorStatus> {
        self.latest.read().await.statuses.get(&id).cloned()
    }

    /// Reports of the last completed cycle (empty before the first one).
    pub async fn reports(&self) -> Vec<SensorReport> {
        self.latest.read().await.reports.clone()
    }
}
