//! Delivers simulated readings to a worker.
//!
//! Each batch is wrapped in the same invocation envelope the function host
//! would send, so a locally running worker can be fed without the hub.

use std::time::Duration;

use serde_json::{json, Value};
use vitals_core::TelemetryReading;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The worker answered with a non-2xx status code.
    #[error("Worker returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Invocation envelope carrying `readings` as a batch of JSON strings.
pub fn invocation_body(readings: &[TelemetryReading]) -> Result<Value, serde_json::Error> {
    let messages = readings
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(json!({
        "Data": { "messages": messages },
        "Metadata": {},
    }))
}

/// Posts batches to one worker endpoint.
pub struct TelemetrySender {
    client: reqwest::Client,
    endpoint: String,
}

impl TelemetrySender {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one batch; returns the worker's `ReturnValue` (the batch
    /// summary) when it sent one.
    pub async fn send(&self, readings: &[TelemetryReading]) -> Result<Value, SendError> {
        let body = invocation_body(readings)?;
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::HttpStatus(status.as_u16()));
        }

        let reply: Value = response.json().await?;
        Ok(reply.get("ReturnValue").cloned().unwrap_or(Value::Null))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
