//! Enriched record persisted for every decoded reading.

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::severity::{AlertCode, Severity};
use crate::telemetry::TelemetryReading;
use crate::thresholds::Evaluation;
use crate::types::{Timestamp, PROCESSED_AT_FORMAT};

/// A reading plus its server-side evaluation.
///
/// Built once per message and never mutated afterwards; fields are only
/// reachable through accessors. Serializes with the reading's fields first,
/// then `processedAt`, `serverStatus` and `alerts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRecord {
    #[serde(flatten)]
    reading: TelemetryReading,
    processed_at: String,
    server_status: Severity,
    alerts: Vec<AlertCode>,
}

impl ProcessedRecord {
    /// Build a record stamped with the current UTC time.
    pub fn new(reading: TelemetryReading, evaluation: Evaluation) -> Self {
        Self::build_at(reading, evaluation, Utc::now())
    }

    /// Build a record stamped with `now`.
    pub fn build_at(reading: TelemetryReading, evaluation: Evaluation, now: Timestamp) -> Self {
        Self {
            reading,
            processed_at: now.format(PROCESSED_AT_FORMAT).to_string(),
            server_status: evaluation.severity,
            alerts: evaluation.alerts,
        }
    }

    pub fn reading(&self) -> &TelemetryReading {
        &self.reading
    }

    pub fn device_id(&self) -> &str {
        &self.reading.device_id
    }

    /// Server-generated processing time, `yyyy-MM-ddTHH:mm:ssZ`.
    pub fn processed_at(&self) -> &str {
        &self.processed_at
    }

    /// Re-parse [`processed_at`](Self::processed_at) as a UTC instant.
    pub fn processed_at_instant(&self) -> Option<Timestamp> {
        NaiveDateTime::parse_from_str(&self.processed_at, PROCESSED_AT_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn severity(&self) -> Severity {
        self.server_status
    }

    pub fn alerts(&self) -> &[AlertCode] {
        &self.alerts
    }

    /// Indented JSON document; non-ASCII text is written unescaped.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
