//! Outbound notifications for critical readings.
//!
//! - [`delivery`]: external delivery channels (webhook).
//! - [`AlertNotifier`]: posts an [`AlertPayload`](vitals_core::AlertPayload)
//!   to the configured endpoint and reports the outcome without failing.

pub mod delivery;
pub mod notifier;

pub use delivery::webhook::{WebhookDelivery, WebhookError};
pub use notifier::{AlertNotifier, NotifyOutcome};
