//! Object storage for processed telemetry records.
//!
//! - [`BlobStore`]: the write-only storage seam.
//! - [`AzureBlobStore`]: Blob REST implementation authenticated with an
//!   account connection string.
//! - [`BlobPublisher`]: serializes a record, computes its partitioned path
//!   and writes it, logging and swallowing every failure.

pub mod azure;
pub mod blob;
pub mod connection_string;
pub mod error;
pub mod publisher;

pub use azure::AzureBlobStore;
pub use blob::BlobStore;
pub use connection_string::{StorageConnection, StorageCredential};
pub use error::CloudError;
pub use publisher::{blob_path, BlobPublisher, PublishOutcome, DEFAULT_CONTAINER};
