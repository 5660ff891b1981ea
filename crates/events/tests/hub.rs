//! Tests for `BroadcastHub`.
//!
//! These exercise the hub directly, without any transport: subscribe and
//! unsubscribe semantics, fan-out delivery, closed-subscriber cleanup and
//! shutdown behaviour.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::Utc;

use airwatch_core::preferences::Preferences;
use airwatch_core::sensor::Sensor;
use airwatch_events::{BroadcastHub, Frame, HubMessage, SnapshotProvider};

/// Snapshot provider returning a fixed single-sensor state.
struct OneSensorSnapshot;

#[async_trait]
impl SnapshotProvider for OneSensorSnapshot {
    async fn snapshot(&self) -> HubMessage {
        HubMessage::Init {
            sensors: vec![Sensor {
                id: 1,
                name: "Porch".into(),
                address: "192.168.1.30".into(),
                created_at: Utc::now(),
            }],
            preferences: Preferences::default(),
            statuses: vec![],
        }
    }
}

fn new_hub() -> BroadcastHub {
    BroadcastHub::new(Arc::new(OneSensorSnapshot))
}

fn parse(frame: Option<Frame>) -> HubMessage {
    match frame {
        Some(Frame::Text(t)) => serde_json::from_str(&t).expect("frame should decode"),
        other => panic!("Expected text frame, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: late joiners get the full state before any update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_precedes_published_updates() {
    let hub = new_hub();
    let mut sub = hub.subscribe().await;

    hub.publish(&HubMessage::SensorDeleted { id: 1 }).await;

    assert_matches!(parse(sub.receiver.recv().await), HubMessage::Init { sensors, .. } if sensors.len() == 1);
    assert_eq!(
        parse(sub.receiver.recv().await),
        HubMessage::SensorDeleted { id: 1 }
    );
}

// ---------------------------------------------------------------------------
// Test: publish reaches every subscriber
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_reaches_all_subscribers() {
    let hub = new_hub();
    let mut subs = Vec::new();
    for _ in 0..3 {
        let mut sub = hub.subscribe().await;
        let _init = sub.receiver.recv().await;
        subs.push(sub);
    }

    let delivered = hub
        .publish(&HubMessage::SensorData { data: vec![] })
        .await;

    assert_eq!(delivered, 3);
    for sub in &mut subs {
        assert_eq!(
            parse(sub.receiver.recv().await),
            HubMessage::SensorData { data: vec![] }
        );
    }
}

// ---------------------------------------------------------------------------
// Test: a closed subscriber is removed and does not disturb a healthy one
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_subscriber_removed_healthy_one_served() {
    let hub = new_hub();
    let mut healthy = hub.subscribe().await;
    let closed = hub.subscribe().await;
    let _init = healthy.receiver.recv().await;

    drop(closed.receiver);
    assert_eq!(hub.subscriber_count().await, 2);

    let delivered = hub.publish(&HubMessage::SensorDeleted { id: 7 }).await;

    assert_eq!(delivered, 1);
    assert_eq!(hub.subscriber_count().await, 1);
    assert_eq!(
        parse(healthy.receiver.recv().await),
        HubMessage::SensorDeleted { id: 7 }
    );
}

// ---------------------------------------------------------------------------
// Test: publishing with nobody listening is fine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_without_subscribers_does_not_panic() {
    let hub = new_hub();
    assert_eq!(hub.publish(&HubMessage::SensorDeleted { id: 1 }).await, 0);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all sends Close and clears the set
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let hub = new_hub();
    let mut a = hub.subscribe().await;
    let mut b = hub.subscribe().await;
    let _ = a.receiver.recv().await;
    let _ = b.receiver.recv().await;

    hub.shutdown_all().await;

    assert_eq!(hub.subscriber_count().await, 0);
    assert_eq!(a.receiver.recv().await, Some(Frame::Close));
    assert_eq!(b.receiver.recv().await, Some(Frame::Close));
    assert!(
        a.receiver.recv().await.is_none(),
        "Queue should end after shutdown"
    );
}

// ---------------------------------------------------------------------------
// Test: subscribe/unsubscribe racing with publish
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_churn_during_publish() {
    let hub = Arc::new(new_hub());

    let churn = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            for _ in 0..200 {
                let sub = hub.subscribe().await;
                hub.unsubscribe(sub.id).await;
            }
        })
    };
    let publisher = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            for id in 0..200 {
                hub.publish(&HubMessage::SensorDeleted { id }).await;
            }
        })
    };

    churn.await.expect("churn task should not panic");
    publisher.await.expect("publisher task should not panic");
    assert_eq!(hub.subscriber_count().await, 0);
}
