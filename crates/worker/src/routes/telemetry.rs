use axum::body::Bytes;
use axum::extract::State;
use axum::{routing::post, Json, Router};

use crate::error::AppResult;
use crate::ingress::{InvocationRequest, InvocationResponse, MESSAGES_BINDING};
use crate::state::AppState;

/// Function name; the host routes invocations to `/{name}`.
pub const FUNCTION_NAME: &str = "ProcessTelemetry";

/// POST /ProcessTelemetry -- run one batch and report its counters.
///
/// Per-message failures are part of the summary, never of the status code.
async fn process_telemetry(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<InvocationResponse>> {
    let request = InvocationRequest::parse(&body)?;
    let messages = request.batch(MESSAGES_BINDING);
    tracing::debug!(count = messages.len(), "Invocation received");

    let summary = state.runner.run(&messages).await;
    Ok(Json(summary.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route(&format!("/{FUNCTION_NAME}"), post(process_telemetry))
}
