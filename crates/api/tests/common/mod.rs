#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use airwatch_api::config::{MonitorConfig, ServerConfig};
use airwatch_api::router::build_app_router;
use airwatch_api::state::AppState;
use airwatch_core::reading::ParticulateReading;
use airwatch_core::status::ProbeResult;
use airwatch_registry::JsonRegistry;
use airwatch_tasmota::Prober;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        registry_path: dir.path().join("sensors.json"),
        static_dir: None,
    }
}

/// Online with `PM2.5 = 7` for every address except those starting with
/// `down`.
pub struct FakeProber;

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, address: &str, _timeout: Duration) -> ProbeResult {
        if address.starts_with("down") {
            ProbeResult::not_found("Connection refused")
        } else {
            ProbeResult::found(ParticulateReading::new().with("PM2.5", 7.0))
        }
    }
}

/// The application under test plus handles into its state.
///
/// Keep the struct alive for the whole test: dropping it removes the
/// registry directory.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(empty_request(Method::GET, uri)).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.request(empty_request(Method::DELETE, uri)).await
    }

    pub async fn post(&self, uri: &str) -> Response<Body> {
        self.request(empty_request(Method::POST, uri)).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.request(json_request(Method::POST, uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.request(json_request(Method::PUT, uri, body)).await
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over a fresh registry in a temp directory, probing through [`FakeProber`].
pub async fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(FakeProber), MonitorConfig::default()).await
}

pub async fn build_test_app_with(prober: Arc<dyn Prober>, monitor: MonitorConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let registry = Arc::new(JsonRegistry::open(&config.registry_path).await.unwrap());
    let state = AppState::new(config.clone(), &monitor, registry, prober).unwrap();
    let app = build_app_router(state.clone(), &config);

    TestApp {
        app,
        state,
        _dir: dir,
    }
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("response body should be JSON")
}
