//! Single-attempt webhook delivery.
//!
//! [`WebhookDelivery`] POSTs a JSON document to an external URL exactly
//! once. There is no retry: a failed attempt is returned to the caller,
//! which decides what to log.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

/// Default HTTP request timeout for a delivery attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers JSON payloads to external webhook endpoints.
#[derive(Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
}

impl WebhookDelivery {
    /// Create a delivery service whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// POST `payload` as indented JSON to `url`.
    ///
    /// Returns the response status on any 2xx.
    pub async fn deliver<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<u16, WebhookError> {
        let body = serde_json::to_vec_pretty(payload)?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::HttpStatus(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
