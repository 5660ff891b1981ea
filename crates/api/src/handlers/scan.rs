//! Network scan streamed as Server-Sent Events.
//!
//! The scan runs in its own task and feeds an unbounded channel (at most one
//! event per batch plus the final one). Progress is also mirrored to every
//! live viewer through the hub. When the client goes away the channel
//! closes and the task drops the scan future, abandoning whatever batch was
//! in flight.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use airwatch_core::messages::{MSG_TYPE_SCAN_COMPLETE, MSG_TYPE_SCAN_ERROR, MSG_TYPE_SCAN_PROGRESS};
use airwatch_events::HubMessage;
use airwatch_tasmota::{DiscoveredDevice, ScanProgress};

use crate::state::AppState;

/// One SSE `data:` payload of a scan stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    Progress(ScanProgress),
    Complete { devices: Vec<DiscoveredDevice> },
    Error { error: String },
}

impl ScanEvent {
    /// The `type` discriminator this event serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanEvent::Progress(_) => MSG_TYPE_SCAN_PROGRESS,
            ScanEvent::Complete { .. } => MSG_TYPE_SCAN_COMPLETE,
            ScanEvent::Error { .. } => MSG_TYPE_SCAN_ERROR,
        }
    }
}

/// POST /api/v1/scan
pub async fn scan_network(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (tx, rx) = mpsc::unbounded_channel::<ScanEvent>();
    let (hub_tx, mut hub_rx) = mpsc::unbounded_channel::<ScanProgress>();
    let scanner = Arc::clone(&state.scanner);
    let hub = Arc::clone(&state.hub);

    // Publishes in batch order; ends once the scan future (and with it
    // `hub_tx`) is dropped.
    tokio::spawn(async move {
        while let Some(progress) = hub_rx.recv().await {
            hub.publish(&HubMessage::ScanProgress {
                scanned: progress.scanned,
                total: progress.total,
                subnet: progress.subnet,
            })
            .await;
        }
    });

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let scan = scanner.scan_local(move |progress| {
            let _ = hub_tx.send(progress.clone());
            let _ = progress_tx.send(ScanEvent::Progress(progress));
        });

        tokio::select! {
            _ = tx.closed() => {
                tracing::info!("Scan client disconnected, scan abandoned");
            }
            result = scan => {
                let event = match result {
                    Ok(run) => ScanEvent::Complete { devices: run.devices },
                    Err(e) => {
                        tracing::warn!(error = %e, "Scan failed");
                        ScanEvent::Error { error: e.to_string() }
                    }
                };
                tracing::info!(event = event.kind(), "Scan stream finished");
                let _ = tx.send(event);
            }
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| Event::default().json_data(event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
