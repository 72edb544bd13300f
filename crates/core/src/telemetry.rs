//! Device telemetry model and the payload decoder.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::UNKNOWN_DEVICE_ID;

/// One vital-signs reading as sent by a device.
///
/// Every vital is optional: an absent value is skipped by the evaluator and
/// is never treated as zero. Unknown JSON fields are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    #[serde(default = "default_device_id", deserialize_with = "device_id_or_unknown")]
    pub device_id: String,
    /// Producer-supplied timestamp, passed through verbatim.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub timestamp: String,
    #[serde(default, serialize_with = "serialize_vital")]
    pub heart_rate: Option<f64>,
    #[serde(default, serialize_with = "serialize_vital")]
    pub blood_pressure_systolic: Option<f64>,
    #[serde(default, serialize_with = "serialize_vital")]
    pub blood_pressure_diastolic: Option<f64>,
    #[serde(default, serialize_with = "serialize_vital")]
    pub body_temperature: Option<f64>,
    #[serde(default, serialize_with = "serialize_vital")]
    pub spo2: Option<f64>,
    #[serde(default, serialize_with = "serialize_vital")]
    pub respiratory_rate: Option<f64>,
    /// Status as judged by the device itself; carried through, never trusted.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub patient_status: String,
}

impl TelemetryReading {
    /// A reading with no vitals.
    pub fn new(device_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp: timestamp.into(),
            heart_rate: None,
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            body_temperature: None,
            spo2: None,
            respiratory_rate: None,
            patient_status: String::new(),
        }
    }

    /// Decode one raw message payload.
    ///
    /// Fails with [`CoreError::Parse`] on invalid JSON or a shape mismatch;
    /// the error keeps a truncated copy of the payload for diagnostics.
    /// Only a JSON object is a reading: arrays are never decoded positionally.
    pub fn decode(payload: &str) -> Result<Self, CoreError> {
        let fail = |e: serde_json::Error| CoreError::parse(e.to_string(), payload);
        let object: Map<String, Value> = serde_json::from_str(payload).map_err(fail)?;
        serde_json::from_value(Value::Object(object)).map_err(fail)
    }
}

fn default_device_id() -> String {
    UNKNOWN_DEVICE_ID.to_string()
}

fn device_id_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_device_id))
}

/// Writes whole-number vitals without a fractional part (`125`, not `125.0`).
pub(crate) fn serialize_vital<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match *value {
        Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => serializer.serialize_some(&(v as i64)),
        Some(v) => serializer.serialize_some(&v),
        None => serializer.serialize_none(),
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
