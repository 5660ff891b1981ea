//! Integration tests for sensor CRUD and its live broadcasts.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use airwatch_core::sensor::MAX_SENSORS;
use airwatch_events::{Frame, HubMessage, Subscription};

async fn next_message(sub: &mut Subscription) -> HubMessage {
    match sub.receiver.recv().await {
        Some(Frame::Text(text)) => serde_json::from_str(&text).unwrap(),
        other => panic!("Expected text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: create, then list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_sensor_returns_201_and_lists_it() {
    let app = common::build_test_app().await;

    let response = app
        .post_json(
            "/api/v1/sensors",
            json!({"name": "  Living room ", "address": "192.168.1.50"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = common::body_json(response).await;
    assert_eq!(created["data"]["id"], 1);
    assert_eq!(created["data"]["name"], "Living room");
    assert_eq!(created["data"]["address"], "192.168.1.50");
    assert!(created["data"]["created_at"].is_string());

    let list = common::body_json(app.get("/api/v1/sensors").await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let one = common::body_json(app.get("/api/v1/sensors/1").await).await;
    assert_eq!(one["data"]["name"], "Living room");
}

// ---------------------------------------------------------------------------
// Test: validation failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_name_is_rejected() {
    let app = common::build_test_app().await;

    let response = app
        .post_json("/api/v1/sensors", json!({"name": "  ", "address": "192.168.1.50"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_address_is_bad_request() {
    let app = common::build_test_app().await;

    let response = app
        .post_json("/api/v1/sensors", json!({"name": "Porch"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn registry_is_capped() {
    let app = common::build_test_app().await;

    for n in 0..MAX_SENSORS {
        let response = app
            .post_json(
                "/api/v1/sensors",
                json!({"name": format!("Sensor {n}"), "address": format!("192.168.1.{}", n + 10)}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .post_json("/api/v1/sensors", json!({"name": "One too many", "address": "192.168.1.99"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: update and delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let app = common::build_test_app().await;
    app.post_json("/api/v1/sensors", json!({"name": "Office", "address": "192.168.1.20"}))
        .await;

    let response = app
        .put_json("/api/v1/sensors/1", json!({"address": "192.168.1.21:8080"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["data"]["name"], "Office");
    assert_eq!(json["data"]["address"], "192.168.1.21:8080");
}

#[tokio::test]
async fn unknown_sensor_is_404() {
    let app = common::build_test_app().await;

    assert_eq!(app.get("/api/v1/sensors/42").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.put_json("/api/v1/sensors/42", json!({"name": "Ghost"}))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete("/api/v1/sensors/42").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = common::build_test_app().await;
    app.post_json("/api/v1/sensors", json!({"name": "Garage", "address": "192.168.1.30"}))
        .await;

    assert_eq!(app.delete("/api/v1/sensors/1").await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete("/api/v1/sensors/1").await.status(), StatusCode::NOT_FOUND);

    let list = common::body_json(app.get("/api/v1/sensors").await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: every change reaches live viewers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn changes_are_broadcast() {
    let app = common::build_test_app().await;
    let mut viewer = app.state.hub.subscribe().await;
    assert!(matches!(next_message(&mut viewer).await, HubMessage::Init { .. }));

    app.post_json("/api/v1/sensors", json!({"name": "Attic", "address": "192.168.1.40"}))
        .await;
    app.put_json("/api/v1/sensors/1", json!({"name": "Loft"})).await;
    app.delete("/api/v1/sensors/1").await;

    match next_message(&mut viewer).await {
        HubMessage::SensorAdded { sensor } => assert_eq!(sensor.name, "Attic"),
        other => panic!("Expected sensor_added, got {other:?}"),
    }
    match next_message(&mut viewer).await {
        HubMessage::SensorUpdated { sensor } => assert_eq!(sensor.name, "Loft"),
        other => panic!("Expected sensor_updated, got {other:?}"),
    }
    assert_eq!(
        next_message(&mut viewer).await,
        HubMessage::SensorDeleted { id: 1 }
    );
}

#[tokio::test]
async fn rejected_change_is_not_broadcast() {
    let app = common::build_test_app().await;
    let mut viewer = app.state.hub.subscribe().await;
    let _init = next_message(&mut viewer).await;

    app.post_json("/api/v1/sensors", json!({"name": "", "address": "192.168.1.40"}))
        .await;

    assert!(viewer.receiver.try_recv().is_err());
}
