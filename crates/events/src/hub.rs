//! Live subscriber registry with non-blocking fan-out.
//!
//! Every subscriber owns a bounded queue. [`BroadcastHub::publish`]
//! serializes a message once and `try_send`s it into each queue, so the
//! publisher never waits on a viewer:
//!
//! - a closed queue (viewer gone) gets its subscriber removed;
//! - a full queue (viewer too slow) loses that one frame, nothing else.
//!
//! The subscriber set is copied under a short read lock before delivery,
//! which lets subscribe/unsubscribe run concurrently with a publish.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::message::HubMessage;

/// Default per-subscriber queue length.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Identifier handed out by [`BroadcastHub::subscribe`].
pub type SubscriberId = Uuid;

/// What a subscriber's transport should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A serialized [`HubMessage`].
    Text(Arc<str>),
    /// Keep-alive probe from the heartbeat task.
    Ping,
    /// The hub is shutting down; close the transport.
    Close,
}

/// Produces the full-state message a new subscriber receives first.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn snapshot(&self) -> HubMessage;
}

/// Handle returned to a new subscriber.
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<Frame>,
}

/// Fan-out hub for live viewers.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Frame>>>,
    snapshot: Arc<dyn SnapshotProvider>,
    capacity: usize,
}

impl BroadcastHub {
    pub fn new(snapshot: Arc<dyn SnapshotProvider>) -> Self {
        Self::with_capacity(snapshot, DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a hub whose subscriber queues hold `capacity` frames.
    pub fn with_capacity(snapshot: Arc<dyn SnapshotProvider>, capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            snapshot,
            capacity: capacity.max(1),
        }
    }

    /// Register a subscriber. Its queue already holds the current snapshot.
    ///
    /// The snapshot is taken while the subscriber set is write-locked, so no
    /// publish can slip in between the snapshot and the registration.
    pub async fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.capacity);

        let mut subscribers = self.subscribers.write().await;

        let snapshot = self.snapshot.snapshot().await;
        if let Some(text) = encode(&snapshot) {
            // Fresh queue with capacity >= 1: cannot be full or closed.
            let _ = tx.try_send(Frame::Text(text));
        }

        subscribers.insert(id, tx);
        tracing::info!(subscriber_id = %id, count = subscribers.len(), "Subscriber joined");

        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(subscriber_id = %id, "Subscriber left");
        }
        removed
    }

    /// Deliver `message` to every open subscriber.
    ///
    /// Returns how many subscribers accepted the frame. Closed subscribers
    /// are removed; failures are logged and never returned.
    pub async fn publish(&self, message: &HubMessage) -> usize {
        let Some(text) = encode(message) else {
            return 0;
        };

        let delivered = self.deliver(Frame::Text(text)).await;
        tracing::debug!(message_type = message.kind(), delivered, "Published hub message");
        delivered
    }

    /// Send a keep-alive ping to every subscriber.
    pub async fn ping_all(&self) {
        self.deliver(Frame::Ping).await;
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Send a Close frame to every subscriber, then forget them all.
    ///
    /// Dropping the senders also ends every receiver once it is drained.
    pub async fn shutdown_all(&self) {
        let mut subscribers = self.subscribers.write().await;
        let count = subscribers.len();
        for sender in subscribers.values() {
            let _ = sender.try_send(Frame::Close);
        }
        subscribers.clear();
        tracing::info!(count, "Closed all subscribers");
    }

    async fn deliver(&self, frame: Frame) -> usize {
        let targets: Vec<(SubscriberId, mpsc::Sender<Frame>)> = self
            .subscribers
            .read()
            .await
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, tx) in targets {
            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber_id = %id, "Subscriber queue full, frame dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &closed {
                subscribers.remove(id);
                tracing::debug!(subscriber_id = %id, "Removed closed subscriber");
            }
        }

        delivered
    }
}

fn encode(message: &HubMessage) -> Option<Arc<str>> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            tracing::error!(error = %e, message_type = message.kind(), "Failed to serialize hub message");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
