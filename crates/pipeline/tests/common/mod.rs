use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use vitals_cloud::{BlobPublisher, BlobStore, CloudError};
use vitals_events::{AlertNotifier, WebhookDelivery};
use vitals_pipeline::BatchRunner;

/// A stored blob: path, body and the overwrite flag it was written with.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub path: String,
    pub body: Vec<u8>,
    pub overwrite: bool,
}

impl StoredBlob {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// How [`MemoryStore`] reacts to a write.
#[derive(Debug, Clone, Copy, Default)]
pub enum StoreBehaviour {
    #[default]
    Accept,
    Fail,
    Panic,
}

/// In-memory [`BlobStore`].
#[derive(Default)]
pub struct MemoryStore {
    pub blobs: Mutex<Vec<StoredBlob>>,
    pub behaviour: StoreBehaviour,
}

impl MemoryStore {
    pub fn with(behaviour: StoreBehaviour) -> Self {
        Self {
            behaviour,
            ..Default::default()
        }
    }

    pub fn blobs(&self) -> Vec<StoredBlob> {
        self.blobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, path: &str, body: Vec<u8>, overwrite: bool) -> Result<(), CloudError> {
        match self.behaviour {
            StoreBehaviour::Accept => {
                self.blobs.lock().unwrap().push(StoredBlob {
                    path: path.to_string(),
                    body,
                    overwrite,
                });
                Ok(())
            }
            StoreBehaviour::Fail => Err(CloudError::HttpStatus {
                status: 500,
                code: Some("InternalError".into()),
            }),
            StoreBehaviour::Panic => panic!("store exploded writing {path}"),
        }
    }
}

/// Bodies received by the local webhook.
pub type Inbox = Arc<Mutex<Vec<serde_json::Value>>>;

/// Start a webhook receiver on an ephemeral port answering `status`.
pub async fn spawn_webhook(status: StatusCode) -> (String, Inbox) {
    let inbox: Inbox = Arc::default();
    let app = Router::new()
        .route(
            "/alerts",
            post(
                move |State(inbox): State<Inbox>, Json(body): Json<serde_json::Value>| async move {
                    inbox.lock().unwrap().push(body);
                    status
                },
            ),
        )
        .with_state(Arc::clone(&inbox));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/alerts"), inbox)
}

/// Build a runner over `store` (or no storage) and an optional webhook URL.
pub fn runner(store: Option<Arc<MemoryStore>>, webhook_url: Option<String>) -> BatchRunner {
    let publisher = match store {
        Some(store) => BlobPublisher::new(store, "processed"),
        None => BlobPublisher::disabled(),
    };
    let delivery = WebhookDelivery::new(Duration::from_secs(5)).unwrap();
    BatchRunner::new(publisher, AlertNotifier::new(webhook_url, delivery))
}
