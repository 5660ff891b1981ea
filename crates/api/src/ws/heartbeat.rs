use std::sync::Arc;
use std::time::Duration;

use airwatch_events::BroadcastHub;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that sends periodic Ping frames to every live
/// viewer.
///
/// Runs until aborted through the returned handle during shutdown.
pub fn start_heartbeat(hub: Arc<BroadcastHub>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = hub.subscriber_count().await;
            tracing::debug!(count, "WebSocket heartbeat ping");
            hub.ping_all().await;
        }
    })
}
