//! Payload sent to the external alert webhook for critical readings.

use serde::Serialize;

use crate::metric_names::{METRIC_BODY_TEMPERATURE, METRIC_HEART_RATE, METRIC_SPO2};
use crate::record::ProcessedRecord;
use crate::severity::{AlertCode, Severity};
use crate::telemetry::serialize_vital;

/// Notification body for one critical reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub device_id: String,
    /// The device's original timestamp.
    pub timestamp: String,
    pub server_status: Severity,
    pub alerts: Vec<AlertCode>,
    #[serde(serialize_with = "serialize_vital")]
    pub heart_rate: Option<f64>,
    #[serde(serialize_with = "serialize_vital")]
    pub body_temperature: Option<f64>,
    #[serde(serialize_with = "serialize_vital")]
    pub spo2: Option<f64>,
    /// `[CRITICAL] {deviceId}: {metric=value, ...} ({alertCode, ...})`
    pub message: String,
}

impl AlertPayload {
    /// Build the payload for a record, or `None` unless it is critical.
    pub fn for_record(record: &ProcessedRecord) -> Option<Self> {
        if !record.severity().is_critical() {
            return None;
        }

        let reading = record.reading();
        let details: Vec<String> = [
            (METRIC_HEART_RATE, reading.heart_rate),
            (METRIC_BODY_TEMPERATURE, reading.body_temperature),
            (METRIC_SPO2, reading.spo2),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
        .collect();

        let codes: Vec<String> = record.alerts().iter().map(ToString::to_string).collect();

        Some(Self {
            device_id: reading.device_id.clone(),
            timestamp: reading.timestamp.clone(),
            server_status: record.severity(),
            alerts: record.alerts().to_vec(),
            heart_rate: reading.heart_rate,
            body_temperature: reading.body_temperature,
            spo2: reading.spo2,
            message: format!(
                "[CRITICAL] {}: {} ({})",
                reading.device_id,
                details.join(", "),
                codes.join(", ")
            ),
        })
    }
}
