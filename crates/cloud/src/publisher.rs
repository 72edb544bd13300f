//! Writes processed records to object storage.
//!
//! Storage problems never propagate out of [`BlobPublisher::publish`]: every
//! failure is logged with the target path and reported as a
//! [`PublishOutcome`] value for the caller to count or ignore.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use vitals_core::ProcessedRecord;

use crate::azure::AzureBlobStore;
use crate::blob::BlobStore;
use crate::connection_string::StorageConnection;
use crate::error::CloudError;

/// Container used when none is configured.
pub const DEFAULT_CONTAINER: &str = "processed";

/// Partitioned storage path for a record:
/// `{deviceId}/{yyyy-MM-dd}/{HH-mm-ss}-{microseconds}.json`.
///
/// Date and time come from the record's own processing timestamp; if that
/// cannot be parsed the current instant is used instead. Processing
/// timestamps have second precision, so the microsecond part is normally
/// `000000`.
pub fn blob_path(record: &ProcessedRecord) -> String {
    let instant = record.processed_at_instant().unwrap_or_else(Utc::now);
    format!(
        "{}/{}/{}.json",
        record.device_id(),
        instant.format("%Y-%m-%d"),
        instant.format("%H-%M-%S-%6f"),
    )
}

/// Result of one publish attempt.
#[derive(Debug)]
pub enum PublishOutcome {
    Uploaded { path: String },
    /// No storage configured.
    Skipped,
    Failed { path: String, error: String },
}

impl PublishOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, PublishOutcome::Uploaded { .. })
    }
}

/// Serializes records and uploads them through a [`BlobStore`].
#[derive(Clone)]
pub struct BlobPublisher {
    store: Option<Arc<dyn BlobStore>>,
    container: String,
}

impl BlobPublisher {
    pub fn new(store: Arc<dyn BlobStore>, container: impl Into<String>) -> Self {
        Self {
            store: Some(store),
            container: container.into(),
        }
    }

    /// A publisher with no backing store; every publish is skipped.
    pub fn disabled() -> Self {
        Self {
            store: None,
            container: DEFAULT_CONTAINER.to_string(),
        }
    }

    /// Build from an optional connection string.
    ///
    /// `None` yields a [disabled](Self::disabled) publisher. A string that
    /// cannot be parsed is an error; callers decide whether that is fatal.
    pub fn from_connection_string(
        connection_string: Option<&str>,
        container: &str,
        timeout: Duration,
    ) -> Result<Self, CloudError> {
        let Some(raw) = connection_string else {
            return Ok(Self::disabled());
        };
        let connection: StorageConnection = raw.parse()?;
        let store = AzureBlobStore::new(connection, container, timeout)?;
        Ok(Self::new(Arc::new(store), container))
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Serialize `record` and write it at [`blob_path`], overwriting any
    /// existing blob.
    pub async fn publish(&self, record: &ProcessedRecord) -> PublishOutcome {
        let path = blob_path(record);

        let Some(store) = &self.store else {
            tracing::error!(
                device_id = record.device_id(),
                path = %path,
                "BLOB-FAIL: storage connection not configured, record not persisted"
            );
            return PublishOutcome::Skipped;
        };

        let body = match record.to_pretty_json() {
            Ok(body) => body,
            Err(e) => return self.failed(path, e.to_string()),
        };

        match store.put(&path, body, true).await {
            Ok(()) => {
                tracing::info!(
                    container = %self.container,
                    path = %path,
                    "BLOB-OK: record uploaded"
                );
                PublishOutcome::Uploaded { path }
            }
            Err(e) => self.failed(path, e.to_string()),
        }
    }

    fn failed(&self, path: String, error: String) -> PublishOutcome {
        tracing::error!(
            container = %self.container,
            path = %path,
            error = %error,
            "BLOB-FAIL: record upload failed"
        );
        PublishOutcome::Failed { path, error }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
