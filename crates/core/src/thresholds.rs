//! Clinical threshold evaluation.
//!
//! Pure logic. Each vital present on a reading is checked against a fixed
//! warning/critical pair in a fixed order (heart rate, body temperature,
//! spo2). A metric contributes at most one alert code, and the overall
//! severity only ever escalates: once critical, later rules cannot lower it.
//!
//! Blood pressure and respiratory rate are carried on the reading but have no
//! threshold here.

use crate::metric_names::{METRIC_BODY_TEMPERATURE, METRIC_HEART_RATE, METRIC_SPO2};
use crate::severity::{AlertCode, AlertQualifier, Severity};
use crate::telemetry::TelemetryReading;

pub const HEART_RATE_WARNING: f64 = 100.0;
pub const HEART_RATE_CRITICAL: f64 = 120.0;
pub const BODY_TEMPERATURE_WARNING: f64 = 37.5;
pub const BODY_TEMPERATURE_CRITICAL: f64 = 38.5;
pub const SPO2_WARNING: f64 = 95.0;
pub const SPO2_CRITICAL: f64 = 90.0;

/// Which side of the threshold is abnormal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Values strictly above the threshold are abnormal.
    Upper,
    /// Values strictly below the threshold are abnormal.
    Lower,
}

impl Bound {
    fn crossed(self, value: f64, threshold: f64) -> bool {
        match self {
            Bound::Upper => value > threshold,
            Bound::Lower => value < threshold,
        }
    }

    fn critical_qualifier(self) -> AlertQualifier {
        match self {
            Bound::Upper => AlertQualifier::High,
            Bound::Lower => AlertQualifier::Low,
        }
    }
}

/// A warning/critical pair for one vital.
#[derive(Debug, Clone, Copy)]
pub struct VitalThreshold {
    pub metric_name: &'static str,
    pub warning_value: f64,
    pub critical_value: f64,
    pub bound: Bound,
    read: fn(&TelemetryReading) -> Option<f64>,
}

impl VitalThreshold {
    /// The reading's value for this vital, if present.
    pub fn value_of(&self, reading: &TelemetryReading) -> Option<f64> {
        (self.read)(reading)
    }
}

fn heart_rate(reading: &TelemetryReading) -> Option<f64> {
    reading.heart_rate
}

fn body_temperature(reading: &TelemetryReading) -> Option<f64> {
    reading.body_temperature
}

fn spo2(reading: &TelemetryReading) -> Option<f64> {
    reading.spo2
}

/// Thresholds in evaluation order. Shared with the device side.
pub const CLINICAL_THRESHOLDS: [VitalThreshold; 3] = [
    VitalThreshold {
        metric_name: METRIC_HEART_RATE,
        warning_value: HEART_RATE_WARNING,
        critical_value: HEART_RATE_CRITICAL,
        bound: Bound::Upper,
        read: heart_rate,
    },
    VitalThreshold {
        metric_name: METRIC_BODY_TEMPERATURE,
        warning_value: BODY_TEMPERATURE_WARNING,
        critical_value: BODY_TEMPERATURE_CRITICAL,
        bound: Bound::Upper,
        read: body_temperature,
    },
    VitalThreshold {
        metric_name: METRIC_SPO2,
        warning_value: SPO2_WARNING,
        critical_value: SPO2_CRITICAL,
        bound: Bound::Lower,
        read: spo2,
    },
];

/// Result of evaluating one reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub severity: Severity,
    /// Alert codes in rule evaluation order.
    pub alerts: Vec<AlertCode>,
}

/// Evaluate a reading against [`CLINICAL_THRESHOLDS`].
pub fn evaluate(reading: &TelemetryReading) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for threshold in &CLINICAL_THRESHOLDS {
        if let Some(value) = threshold.value_of(reading) {
            check_threshold(threshold, value, &mut evaluation);
        }
    }

    evaluation
}

/// Compare a single value against its threshold pair and escalate if crossed.
fn check_threshold(threshold: &VitalThreshold, value: f64, evaluation: &mut Evaluation) {
    let (level, qualifier) = if threshold.bound.crossed(value, threshold.critical_value) {
        (Severity::Critical, threshold.bound.critical_qualifier())
    } else if threshold.bound.crossed(value, threshold.warning_value) {
        (Severity::Warning, AlertQualifier::Elevated)
    } else {
        return; // within normal range
    };

    evaluation
        .alerts
        .push(AlertCode::new(threshold.metric_name, qualifier));
    evaluation.severity.escalate(level);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(hr: Option<f64>, temp: Option<f64>, spo2: Option<f64>) -> TelemetryReading {
        TelemetryReading {
            heart_rate: hr,
            body_temperature: temp,
            spo2,
            ..TelemetryReading::new("dev", "2024-01-01T00:00:00Z")
        }
    }

    fn codes(evaluation: &Evaluation) -> Vec<String> {
        evaluation.alerts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn all_vitals_absent_is_normal() {
        let evaluation = evaluate(&reading(None, None, None));
        assert_eq!(evaluation.severity, Severity::Normal);
        assert!(evaluation.alerts.is_empty());
    }

    #[test]
    fn normal_values_raise_nothing() {
        let evaluation = evaluate(&reading(Some(72.0), Some(36.6), Some(98.0)));
        assert_eq!(evaluation, Evaluation::default());
    }

    #[test]
    fn heart_rate_above_critical() {
        for hr in [120.5, 125.0, 180.0] {
            let evaluation = evaluate(&reading(Some(hr), None, None));
            assert_eq!(evaluation.severity, Severity::Critical);
            assert_eq!(codes(&evaluation), ["heartRate:high"]);
        }
    }

    #[test]
    fn heart_rate_in_warning_band() {
        for hr in [100.5, 110.0, 120.0] {
            let evaluation = evaluate(&reading(Some(hr), None, None));
            assert_eq!(evaluation.severity, Severity::Warning);
            assert_eq!(codes(&evaluation), ["heartRate:elevated"]);
        }
    }

    #[test]
    fn thresholds_are_strict() {
        let evaluation = evaluate(&reading(Some(100.0), Some(37.5), Some(95.0)));
        assert_eq!(evaluation, Evaluation::default());

        let evaluation = evaluate(&reading(None, Some(38.5), Some(90.0)));
        assert_eq!(evaluation.severity, Severity::Warning);
        assert_eq!(codes(&evaluation), ["bodyTemperature:elevated", "spo2:elevated"]);
    }

    #[test]
    fn body_temperature_levels() {
        assert_eq!(
            codes(&evaluate(&reading(None, Some(38.6), None))),
            ["bodyTemperature:high"]
        );
        assert_eq!(
            codes(&evaluate(&reading(None, Some(37.6), None))),
            ["bodyTemperature:elevated"]
        );
    }

    #[test]
    fn low_spo2_is_critical_regardless_of_other_vitals() {
        let evaluation = evaluate(&reading(Some(72.0), Some(36.6), Some(85.0)));
        assert_eq!(evaluation.severity, Severity::Critical);
        assert_eq!(codes(&evaluation), ["spo2:low"]);

        let evaluation = evaluate(&reading(Some(110.0), Some(37.8), Some(85.0)));
        assert_eq!(evaluation.severity, Severity::Critical);
        assert_eq!(
            codes(&evaluation),
            ["heartRate:elevated", "bodyTemperature:elevated", "spo2:low"]
        );
    }

    #[test]
    fn critical_is_sticky_across_later_warnings() {
        let evaluation = evaluate(&reading(Some(130.0), Some(37.8), Some(93.0)));
        assert_eq!(evaluation.severity, Severity::Critical);
        assert_eq!(
            codes(&evaluation),
            ["heartRate:high", "bodyTemperature:elevated", "spo2:elevated"]
        );
    }

    #[test]
    fn severity_never_decreases_along_evaluation_order() {
        let samples = [None, Some(60.0), Some(110.0), Some(130.0)];
        let temps = [None, Some(36.5), Some(38.0), Some(39.5)];
        let spo2s = [None, Some(99.0), Some(92.0), Some(85.0)];

        for hr in samples {
            for temp in temps {
                for spo2 in spo2s {
                    let full = evaluate(&reading(hr, temp, spo2));
                    let prefix_hr = evaluate(&reading(hr, None, None));
                    let prefix_hr_temp = evaluate(&reading(hr, temp, None));
                    assert!(prefix_hr.severity <= prefix_hr_temp.severity);
                    assert!(prefix_hr_temp.severity <= full.severity);
                    assert!(full.alerts.len() <= 3);
                }
            }
        }
    }

    #[test]
    fn blood_pressure_and_respiratory_rate_are_not_evaluated() {
        let mut r = reading(None, None, None);
        r.blood_pressure_systolic = Some(220.0);
        r.blood_pressure_diastolic = Some(140.0);
        r.respiratory_rate = Some(40.0);
        assert_eq!(evaluate(&r), Evaluation::default());
    }

    #[test]
    fn thresholds_are_in_fixed_order() {
        let names: Vec<_> = CLINICAL_THRESHOLDS.iter().map(|t| t.metric_name).collect();
        assert_eq!(names, [METRIC_HEART_RATE, METRIC_BODY_TEMPERATURE, METRIC_SPO2]);
    }
}
