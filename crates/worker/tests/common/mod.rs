use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vitals_cloud::{BlobPublisher, BlobStore, CloudError};
use vitals_events::{AlertNotifier, WebhookDelivery};
use vitals_pipeline::BatchRunner;
use vitals_worker::config::WorkerConfig;
use vitals_worker::router::build_app_router;
use vitals_worker::state::AppState;

/// In-memory [`BlobStore`] keeping every written path.
#[derive(Default)]
pub struct MemoryStore {
    pub paths: Mutex<Vec<String>>,
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, path: &str, _body: Vec<u8>, _overwrite: bool) -> Result<(), CloudError> {
        self.paths.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Build a test `WorkerConfig` from the given variables.
pub fn test_config(pairs: &[(&str, &str)]) -> WorkerConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    WorkerConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
}

/// Full router over an in-memory store and no webhook.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let delivery = WebhookDelivery::new(Duration::from_secs(5)).unwrap();
    let runner = BatchRunner::new(
        BlobPublisher::new(store, "processed"),
        AlertNotifier::new(None, delivery),
    );
    build_app_router(AppState::new(runner, test_config(&[])))
}

/// Full router built the way the binary builds it.
pub fn build_configured_app(pairs: &[(&str, &str)]) -> Router {
    build_app_router(AppState::from_config(test_config(pairs)).unwrap())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: impl Into<String>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
