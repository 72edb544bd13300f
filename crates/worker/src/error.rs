use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vitals_cloud::CloudError;
use vitals_events::WebhookError;

use crate::ingress::EnvelopeError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request body is not an invocation envelope.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Envelope(err) => {
                tracing::warn!(error = %err, "Rejected invocation request");
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Failure to assemble the worker's collaborators at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Storage client setup failed: {0}")]
    Storage(#[from] CloudError),

    #[error("Webhook client setup failed: {0}")]
    Webhook(#[from] WebhookError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_errors_map_to_400() {
        let response = AppError::from(EnvelopeError::NotAnObject).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
