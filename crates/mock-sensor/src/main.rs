//! Standalone fake PMS5003 device for local development.
//!
//! | Variable                 | Default   |
//! |--------------------------|-----------|
//! | `MOCK_SENSOR_HOST`       | `0.0.0.0` |
//! | `MOCK_SENSOR_PORT`       | `8080`    |
//! | `MOCK_SENSOR_MODE`       | `random`  |
//! | `MOCK_SENSOR_DELAY_MS`   | `0`       |

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airwatch_mock_sensor::{MockBehavior, MockSensor, DEFAULT_PORT};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airwatch_mock_sensor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::var("MOCK_SENSOR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MOCK_SENSOR_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let mode = std::env::var("MOCK_SENSOR_MODE").unwrap_or_else(|_| "random".into());
    let behavior = MockBehavior::from_mode(&mode).unwrap_or_else(|| {
        tracing::warn!(mode = %mode, "Unknown MOCK_SENSOR_MODE, using random");
        MockBehavior::Random
    });
    let delay_ms: u64 = std::env::var("MOCK_SENSOR_DELAY_MS")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(0);

    let sensor = MockSensor::new(behavior).with_delay(Duration::from_millis(delay_ms));

    let addr = SocketAddr::new(host.parse().expect("Invalid MOCK_SENSOR_HOST address"), port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, behavior = ?sensor.behavior, "Mock sensor listening");

    axum::serve(listener, airwatch_mock_sensor::router(sensor))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("Server error");

    tracing::info!("Mock sensor stopped");
}
