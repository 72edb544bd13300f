/// Maximum number of payload characters kept for diagnostics.
pub const PAYLOAD_SNIPPET_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The payload is not valid JSON or does not have the telemetry shape.
    #[error("Malformed telemetry payload: {reason}")]
    Parse {
        reason: String,
        /// First [`PAYLOAD_SNIPPET_CHARS`] characters of the offending payload.
        snippet: String,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Build a parse error, truncating the payload for logging.
    pub fn parse(reason: impl Into<String>, payload: &str) -> Self {
        CoreError::Parse {
            reason: reason.into(),
            snippet: payload_snippet(payload),
        }
    }
}

/// Truncate a raw payload to at most [`PAYLOAD_SNIPPET_CHARS`] characters.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn payload_snippet(payload: &str) -> String {
    payload.chars().take(PAYLOAD_SNIPPET_CHARS).collect()
}
