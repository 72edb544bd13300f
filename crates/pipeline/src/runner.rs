use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::Serialize;
use vitals_cloud::BlobPublisher;
use vitals_core::{evaluate, AlertPayload, CoreError, ProcessedRecord, Severity, TelemetryReading};
use vitals_events::AlertNotifier;

use crate::error::MessageError;

/// Counters for one batch invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Messages that decoded and went through publishing, whatever the
    /// storage or webhook outcome.
    pub processed: usize,
    /// Processed messages evaluated as critical.
    pub critical: usize,
    /// Messages that failed to decode or panicked.
    pub errors: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Batch complete: {} processed (critical: {}, errors: {})",
            self.processed, self.critical, self.errors
        )
    }
}

/// Runs batches of raw telemetry payloads through the pipeline.
#[derive(Clone)]
pub struct BatchRunner {
    publisher: BlobPublisher,
    notifier: AlertNotifier,
}

impl BatchRunner {
    pub fn new(publisher: BlobPublisher, notifier: AlertNotifier) -> Self {
        Self {
            publisher,
            notifier,
        }
    }

    pub fn publisher(&self) -> &BlobPublisher {
        &self.publisher
    }

    pub fn notifier(&self) -> &AlertNotifier {
        &self.notifier
    }

    /// Process every message in order and return the counters.
    ///
    /// A message that fails, for any reason including a panic, is counted
    /// and skipped; it never stops the batch.
    pub async fn run<S: AsRef<str>>(&self, messages: &[S]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (index, raw) in messages.iter().enumerate() {
            let raw = raw.as_ref();
            let result = AssertUnwindSafe(self.process_message(raw))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(MessageError::from_panic(panic)));

            match result {
                Ok(severity) => {
                    summary.processed += 1;
                    if severity.is_critical() {
                        summary.critical += 1;
                    }
                }
                Err(MessageError::Core(CoreError::Parse { reason, snippet })) => {
                    summary.errors += 1;
                    tracing::error!(index, error = %reason, body = %snippet, "PARSE-ERROR");
                }
                Err(e) => {
                    summary.errors += 1;
                    tracing::error!(index, error = %e, "PROCESS-ERROR");
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            critical = summary.critical,
            errors = summary.errors,
            "BATCH: {summary}"
        );
        summary
    }

    /// One message through every stage. Storage and webhook failures are
    /// absorbed by their components; only decoding can fail here.
    async fn process_message(&self, raw: &str) -> Result<Severity, MessageError> {
        let reading = TelemetryReading::decode(raw)?;
        let evaluation = evaluate(&reading);
        let record = ProcessedRecord::new(reading, evaluation);

        self.publisher.publish(&record).await;

        if let Some(payload) = AlertPayload::for_record(&record) {
            tracing::warn!(
                device_id = %payload.device_id,
                alert = %payload.message,
                "CRITICAL"
            );
            self.notifier.notify(&payload).await;
        }

        Ok(record.severity())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
