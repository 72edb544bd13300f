//! Function host custom-handler envelope.
//!
//! The host POSTs each batched trigger invocation as
//! `{"Data": {"<binding>": <batch>}, "Metadata": {...}}` and expects
//! `{"Outputs": {...}, "Logs": [...], "ReturnValue": ...}` back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vitals_pipeline::BatchSummary;

/// Name of the trigger binding carrying the batch (see `function.json`).
pub const MESSAGES_BINDING: &str = "messages";

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Request body is not valid JSON: {0}")]
    Json(serde_json::Error),

    #[error("Request body is not an invocation envelope object")]
    NotAnObject,

    #[error("Invalid invocation envelope: {0}")]
    Shape(serde_json::Error),
}

/// Incoming invocation. `Metadata` and any other top-level keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct InvocationRequest {
    #[serde(rename = "Data", default)]
    pub data: Map<String, Value>,
}

impl InvocationRequest {
    pub fn parse(body: &[u8]) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_slice(body).map_err(EnvelopeError::Json)?;
        if !value.is_object() {
            return Err(EnvelopeError::NotAnObject);
        }
        serde_json::from_value(value).map_err(EnvelopeError::Shape)
    }

    /// Raw payloads bound to `binding`, in delivery order.
    ///
    /// - missing or `null`: empty batch
    /// - array: strings are taken as-is, other values re-serialized
    /// - string holding a JSON array: its elements, same rules
    /// - any other string or value: a single payload
    pub fn batch(&self, binding: &str) -> Vec<String> {
        match self.data.get(binding) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(payload_text).collect(),
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(items)) => items.iter().map(payload_text).collect(),
                _ => vec![text.clone()],
            },
            Some(other) => vec![other.to_string()],
        }
    }
}

fn payload_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Reply to the host.
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "Outputs")]
    pub outputs: Map<String, Value>,
    #[serde(rename = "Logs")]
    pub logs: Vec<String>,
    #[serde(rename = "ReturnValue")]
    pub return_value: BatchSummary,
}

impl From<BatchSummary> for InvocationResponse {
    fn from(summary: BatchSummary) -> Self {
        Self {
            outputs: Map::new(),
            logs: vec![summary.to_string()],
            return_value: summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
