//! Stand-in for a Tasmota PMS5003 device.
//!
//! Serves the `/cm` command endpoint with the same JSON shape a real device
//! returns for `Status 10`. Used for local development (see the binary) and
//! by integration tests that need a sensor on a real socket.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;

use airwatch_core::reading::ParticulateReading;

/// Default port of the standalone binary.
pub const DEFAULT_PORT: u16 = 8080;

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

/// What the device answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Fresh random values on every request.
    Random,
    /// Always the same reading.
    Fixed(ParticulateReading),
    /// Valid status JSON without a `PMS5003` block.
    NoData,
    /// A body that is not JSON.
    Malformed,
}

impl MockBehavior {
    /// Parse the `MOCK_SENSOR_MODE` value of the binary.
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "nodata" | "no_data" => Some(Self::NoData),
            "malformed" => Some(Self::Malformed),
            _ => None,
        }
    }
}

/// A configured fake device.
#[derive(Debug, Clone)]
pub struct MockSensor {
    pub behavior: MockBehavior,
    /// Held before every response; longer than a client's timeout means
    /// the device looks unresponsive.
    pub delay: Duration,
}

impl MockSensor {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
        }
    }

    pub fn random() -> Self {
        Self::new(MockBehavior::Random)
    }

    pub fn fixed(reading: ParticulateReading) -> Self {
        Self::new(MockBehavior::Fixed(reading))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CommandQuery {
    cmnd: Option<String>,
}

pub fn router(sensor: MockSensor) -> Router {
    Router::new()
        .route("/cm", get(command))
        .with_state(sensor)
}

/// Serve `sensor` on an ephemeral localhost port.
///
/// Returns the bound address and the server task; abort the task to stop
/// the device.
pub async fn spawn(sensor: MockSensor) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    let app = router(sensor);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Mock sensor server failed");
        }
    });

    Ok((addr, handle))
}

async fn command(State(sensor): State<MockSensor>, Query(query): Query<CommandQuery>) -> Response {
    tracing::debug!(cmnd = ?query.cmnd, behavior = ?sensor.behavior, "Mock sensor request");

    if !sensor.delay.is_zero() {
        tokio::time::sleep(sensor.delay).await;
    }

    let time = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

    match sensor.behavior {
        MockBehavior::Random => status_reply(&time, &random_reading()),
        MockBehavior::Fixed(reading) => status_reply(&time, &reading),
        MockBehavior::NoData => Json(json!({ "StatusSNS": { "Time": time } })).into_response(),
        MockBehavior::Malformed => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<html><body>Tasmota</body></html>",
        )
            .into_response(),
    }
}

fn status_reply(time: &str, reading: &ParticulateReading) -> Response {
    Json(json!({
        "StatusSNS": {
            "Time": time,
            "PMS5003": reading,
        }
    }))
    .into_response()
}

/// A plausible indoor reading with every PMS5003 field populated.
pub fn random_reading() -> ParticulateReading {
    const RANGES: &[(&str, u32, u32)] = &[
        ("CF1", 0, 5),
        ("CF2.5", 0, 10),
        ("CF10", 0, 15),
        ("PM1", 0, 5),
        ("PM2.5", 5, 25),
        ("PM10", 10, 50),
        ("PB0.3", 100, 1000),
        ("PB0.5", 50, 500),
        ("PB1", 20, 200),
        ("PB2.5", 10, 100),
        ("PB5", 5, 50),
        ("PB10", 1, 10),
    ];

    let mut rng = rand::rng();
    RANGES
        .iter()
        .fold(ParticulateReading::new(), |reading, (name, low, high)| {
            reading.with(*name, f64::from(rng.random_range(*low..=*high)))
        })
}
