use async_trait::async_trait;

use crate::error::CloudError;

/// Write-only blob sink.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `body` at `path` inside the store's container.
    ///
    /// With `overwrite = false` an existing blob is left untouched and the
    /// call fails.
    async fn put(&self, path: &str, body: Vec<u8>, overwrite: bool) -> Result<(), CloudError>;
}
