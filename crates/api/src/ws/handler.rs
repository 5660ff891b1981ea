use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use airwatch_events::{BroadcastHub, Frame, Subscription};

use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection subscribes to the hub; its first frame
/// is the `init` snapshot.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Subscribes to the hub.
///   2. Spawns a sender task that forwards hub frames to the sink.
///   3. Drains inbound messages on the current task.
///   4. Unsubscribes on disconnect.
async fn handle_socket(socket: WebSocket, hub: Arc<BroadcastHub>) {
    let Subscription { id, mut receiver } = hub.subscribe().await;
    tracing::info!(subscriber_id = %id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(frame) = receiver.recv().await {
            let (message, last) = match frame {
                Frame::Text(text) => (Message::Text(text.as_ref().into()), false),
                Frame::Ping => (Message::Ping(Bytes::new()), false),
                Frame::Close => (Message::Close(None), true),
            };
            if sink.send(message).await.is_err() {
                tracing::debug!(subscriber_id = %id, "WebSocket sink closed");
                break;
            }
            if last {
                break;
            }
        }
    });

    // Viewers only listen; inbound traffic is control frames.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(subscriber_id = %id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(subscriber_id = %id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    hub.unsubscribe(id).await;
    send_task.abort();
    tracing::info!(subscriber_id = %id, "WebSocket disconnected");
}
