//! Single-address status probe for Tasmota PMS5003 devices.
//!
//! Sends `GET /cm?cmnd=Status%2010` and looks for `StatusSNS.PMS5003` in
//! the JSON reply. Every way this can go wrong (no answer in time, refused
//! connection, garbage body, wrong JSON shape) ends up as a
//! [`ProbeResult::not_found`] carrying a reason, so callers can fan probes
//! out without per-call error handling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONNECTION;

use airwatch_core::reading::ParticulateReading;
use airwatch_core::status::ProbeResult;

/// Status command path (`Status 10` = sensor readings).
pub const STATUS_PATH: &str = "/cm?cmnd=Status%2010";

/// JSON pointer to the PMS5003 block inside the status reply.
pub const PMS5003_POINTER: &str = "/StatusSNS/PMS5003";

/// Why a probe did not find a sensor. Rendered into the result's reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    /// No complete reply before the deadline.
    #[error("timeout")]
    Timeout,

    /// Refused, unreachable, DNS failure, reset mid-body...
    #[error("{0}")]
    Connection(String),

    /// The body is not JSON.
    #[error("invalid response")]
    MalformedResponse,

    /// Valid JSON without a PMS5003 block.
    #[error("no data")]
    MissingField,
}

impl From<ProbeFailure> for ProbeResult {
    fn from(failure: ProbeFailure) -> Self {
        ProbeResult::not_found(failure.to_string())
    }
}

/// Anything that can test one address for a sensor.
///
/// Implementations must always resolve; the scanner and poller rely on it.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeResult;
}

/// HTTP prober talking to real devices.
#[derive(Clone)]
pub struct DeviceProbe {
    client: reqwest::Client,
}

impl DeviceProbe {
    /// Create a prober with its own HTTP client.
    ///
    /// The client bypasses system proxies (targets are LAN addresses) and
    /// keeps no idle connections, mirroring `Connection: close`.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .no_proxy()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client for probes");
                reqwest::Client::new()
            });
        Self::with_client(client)
    }

    /// Create a prober reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Status URL for `address` (`host` or `host:port`).
    pub fn status_url(address: &str) -> String {
        format!("http://{address}{STATUS_PATH}")
    }

    async fn fetch(&self, address: &str) -> Result<ParticulateReading, ProbeFailure> {
        let response = self
            .client
            .get(Self::status_url(address))
            .header(CONNECTION, "close")
            .send()
            .await
            .map_err(connection_failure)?;

        let body = response.bytes().await.map_err(connection_failure)?;
        parse_status_body(&body)
    }
}

impl Default for DeviceProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for DeviceProbe {
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeResult {
        // Dropping the fetch future on timeout tears down the connection.
        let outcome = match tokio::time::timeout(timeout, self.fetch(address)).await {
            Ok(Ok(reading)) => Ok(reading),
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(ProbeFailure::Timeout),
        };

        match outcome {
            Ok(reading) => {
                tracing::trace!(address, "Probe found sensor");
                ProbeResult::found(reading)
            }
            Err(failure) => {
                tracing::trace!(address, reason = %failure, "Probe found nothing");
                failure.into()
            }
        }
    }
}

/// Extract the PMS5003 reading from a raw status reply.
pub fn parse_status_body(body: &[u8]) -> Result<ParticulateReading, ProbeFailure> {
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ProbeFailure::MalformedResponse)?;

    json.pointer(PMS5003_POINTER)
        .and_then(ParticulateReading::from_json)
        .ok_or(ProbeFailure::MissingField)
}

/// Classify a transport error, keeping the innermost cause's message
/// (e.g. "Connection refused (os error 111)").
fn connection_failure(err: reqwest::Error) -> ProbeFailure {
    if err.is_timeout() {
        return ProbeFailure::Timeout;
    }

    let mut cause: &dyn std::error::Error = &err;
    while let Some(source) = cause.source() {
        cause = source;
    }
    ProbeFailure::Connection(cause.to_string())
}
