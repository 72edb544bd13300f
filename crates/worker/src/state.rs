use std::sync::Arc;

use vitals_cloud::{BlobPublisher, CloudError};
use vitals_events::{AlertNotifier, WebhookDelivery};
use vitals_pipeline::BatchRunner;

use crate::config::WorkerConfig;
use crate::error::StartupError;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the runner and configuration sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<BatchRunner>,
    pub config: Arc<WorkerConfig>,
}

impl AppState {
    pub fn new(runner: BatchRunner, config: WorkerConfig) -> Self {
        Self {
            runner: Arc::new(runner),
            config: Arc::new(config),
        }
    }

    /// Wire the publisher and notifier described by `config`.
    ///
    /// A storage connection string that does not parse is logged and treated
    /// as unset, so every record is skipped rather than the worker refusing
    /// to start.
    pub fn from_config(config: WorkerConfig) -> Result<Self, StartupError> {
        let publisher = match BlobPublisher::from_connection_string(
            config.storage_connection_string.as_deref(),
            &config.container_name,
            config.storage_timeout(),
        ) {
            Ok(publisher) => publisher,
            Err(CloudError::InvalidConnectionString(reason)) => {
                tracing::error!(
                    error = %reason,
                    "ProcessedBlobConnectionString is invalid, records will not be persisted"
                );
                BlobPublisher::disabled()
            }
            Err(e) => return Err(e.into()),
        };

        let delivery = WebhookDelivery::new(config.webhook_timeout())?;
        let notifier = AlertNotifier::new(config.webhook_url.clone(), delivery);

        Ok(Self::new(BatchRunner::new(publisher, notifier), config))
    }
}
