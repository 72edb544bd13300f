//! Critical-alert notifier.
//!
//! Wraps [`WebhookDelivery`] with the optional endpoint URL. Nothing here
//! returns an error: an unset URL is a skip and a failed POST is logged and
//! reported as [`NotifyOutcome::Failed`].

use vitals_core::AlertPayload;

use crate::delivery::webhook::WebhookDelivery;

/// Result of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent { status: u16 },
    /// No endpoint configured.
    Skipped,
    Failed { error: String },
}

/// Posts alert payloads to the configured webhook.
#[derive(Clone)]
pub struct AlertNotifier {
    url: Option<String>,
    delivery: WebhookDelivery,
}

impl AlertNotifier {
    pub fn new(url: Option<String>, delivery: WebhookDelivery) -> Self {
        Self { url, delivery }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Deliver `payload` once.
    pub async fn notify(&self, payload: &AlertPayload) -> NotifyOutcome {
        let Some(url) = self.url.as_deref() else {
            tracing::warn!(
                device_id = %payload.device_id,
                alert = %payload.message,
                "ALERT-SKIP: webhook URL not configured"
            );
            return NotifyOutcome::Skipped;
        };

        match self.delivery.deliver(url, payload).await {
            Ok(status) => {
                tracing::info!(device_id = %payload.device_id, status, "ALERT-SENT");
                NotifyOutcome::Sent { status }
            }
            Err(e) => {
                tracing::error!(
                    device_id = %payload.device_id,
                    error = %e,
                    "ALERT-FAIL: webhook delivery failed"
                );
                NotifyOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
