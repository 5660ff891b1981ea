//! LAN sweep for PMS5003 devices.
//!
//! Hosts `.1` through `.254` of each subnet are probed in fixed-size
//! batches. A batch runs concurrently and must fully settle before the next
//! one starts, so at most `batch_size` probes are ever in flight. Progress
//! is reported once per settled batch with a running total across all
//! subnets.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use airwatch_core::reading::ParticulateReading;

use crate::probe::Prober;
use crate::subnet::{is_valid_prefix, SubnetDetector};

/// Host numbers `1..=254` per /24.
pub const HOSTS_PER_SUBNET: usize = 254;

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_millis(800);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Invalid subnet '{0}': expected three octets such as 192.168.1")]
    InvalidSubnet(String),
}

/// Cumulative progress after one settled batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub scanned: usize,
    pub total: usize,
    /// Subnet the batch belonged to.
    pub subnet: String,
}

/// A host that answered with a PMS5003 reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub address: String,
    pub reading: ParticulateReading,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRunResult {
    pub devices: Vec<DiscoveredDevice>,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Probes in flight per batch.
    pub batch_size: usize,
    /// Per-probe deadline.
    pub timeout: Duration,
    /// Scan exactly these subnets instead of detecting them.
    pub subnets: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_SCAN_TIMEOUT,
            subnets: None,
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkScanner
// ---------------------------------------------------------------------------

pub struct NetworkScanner {
    prober: Arc<dyn Prober>,
    detector: SubnetDetector,
    config: ScanConfig,
}

impl std::fmt::Debug for NetworkScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkScanner")
            .field("detector", &self.detector)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NetworkScanner {
    /// Validates `config` up front so a bad value surfaces at startup.
    pub fn new(
        prober: Arc<dyn Prober>,
        detector: SubnetDetector,
        config: ScanConfig,
    ) -> Result<Self, ScanError> {
        if config.batch_size == 0 {
            return Err(ScanError::InvalidBatchSize);
        }
        if let Some(subnets) = &config.subnets {
            validate_subnets(subnets)?;
        }
        Ok(Self {
            prober,
            detector,
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Subnets a [`scan_local`](Self::scan_local) would cover right now.
    pub async fn target_subnets(&self) -> Vec<String> {
        match &self.config.subnets {
            Some(subnets) if !subnets.is_empty() => subnets.clone(),
            _ => self.detector.detect().await,
        }
    }

    /// Sweep the configured or detected subnets.
    pub async fn scan_local<F>(&self, on_progress: F) -> Result<ScanRunResult, ScanError>
    where
        F: FnMut(ScanProgress) + Send,
    {
        let subnets = self.target_subnets().await;
        self.scan(&subnets, on_progress).await
    }

    /// Sweep `subnets` in order. Devices are returned in discovery order.
    pub async fn scan<F>(
        &self,
        subnets: &[String],
        mut on_progress: F,
    ) -> Result<ScanRunResult, ScanError>
    where
        F: FnMut(ScanProgress) + Send,
    {
        validate_subnets(subnets)?;

        let total = subnets.len() * HOSTS_PER_SUBNET;
        let mut scanned = 0;
        let mut devices = Vec::new();

        tracing::info!(?subnets, total, batch_size = self.config.batch_size, "Starting network scan");

        for subnet in subnets {
            let hosts: Vec<String> = (1..=HOSTS_PER_SUBNET)
                .map(|host| format!("{subnet}.{host}"))
                .collect();

            for batch in hosts.chunks(self.config.batch_size) {
                let results = join_all(
                    batch
                        .iter()
                        .map(|address| self.prober.probe(address, self.config.timeout)),
                )
                .await;

                for (address, result) in batch.iter().zip(results) {
                    if let Some(reading) = result.into_reading() {
                        tracing::info!(address = %address, "Discovered sensor");
                        devices.push(DiscoveredDevice {
                            address: address.clone(),
                            reading,
                        });
                    }
                }

                scanned += batch.len();
                on_progress(ScanProgress {
                    scanned,
                    total,
                    subnet: subnet.clone(),
                });
            }
        }

        tracing::info!(found = devices.len(), scanned, "Network scan complete");
        Ok(ScanRunResult { devices })
    }
}

fn validate_subnets(subnets: &[String]) -> Result<(), ScanError> {
    match subnets.iter().find(|s| !is_valid_prefix(s)) {
        Some(bad) => Err(ScanError::InvalidSubnet(bad.clone())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
