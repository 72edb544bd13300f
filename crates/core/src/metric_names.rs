//! Canonical vital-sign names.
//!
//! These match the JSON field names sent by devices and are the metric half
//! of every alert code (`heartRate:high`, `spo2:low`, ...).

/// Pulse in beats per minute.
pub const METRIC_HEART_RATE: &str = "heartRate";

/// Body temperature in degrees Celsius.
pub const METRIC_BODY_TEMPERATURE: &str = "bodyTemperature";

/// Peripheral oxygen saturation in percent.
pub const METRIC_SPO2: &str = "spo2";
