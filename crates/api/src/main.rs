use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airwatch_api::config::{MonitorConfig, ServerConfig};
use airwatch_api::live::HubPublisher;
use airwatch_api::router::build_app_router;
use airwatch_api::state::AppState;
use airwatch_api::ws;
use airwatch_registry::JsonRegistry;
use airwatch_tasmota::DeviceProbe;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airwatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let monitor_config = MonitorConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        poll_interval_ms = monitor_config.poll_interval_ms,
        poll_timeout_ms = monitor_config.poll_timeout_ms,
        scan_batch_size = monitor_config.scan_batch_size,
        scan_timeout_ms = monitor_config.scan_timeout_ms,
        "Loaded monitor configuration"
    );

    // --- Registry ---
    let registry = Arc::new(
        JsonRegistry::open(&config.registry_path)
            .await
            .expect("Failed to open sensor registry"),
    );
    let sensor_count = registry.sensors().await.len();
    tracing::info!(path = %config.registry_path.display(), sensor_count, "Sensor registry opened");

    // --- Services ---
    let prober = Arc::new(DeviceProbe::new());
    let state = AppState::new(config.clone(), &monitor_config, registry, prober)
        .expect("Invalid monitor configuration");

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&state.hub));

    // --- Poller ---
    state
        .poller
        .start(
            monitor_config.poll_interval(),
            Arc::new(HubPublisher::new(Arc::clone(&state.hub))),
        )
        .await
        .expect("Failed to start sensor poller");

    let hub = Arc::clone(&state.hub);
    let poller = Arc::clone(&state.poller);

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    poller.shutdown(config.shutdown_timeout()).await;

    let viewer_count = hub.subscriber_count().await;
    tracing::info!(viewer_count, "Closing remaining WebSocket connections");
    hub.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
