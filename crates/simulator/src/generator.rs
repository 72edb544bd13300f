//! Random vital-sign readings.
//!
//! The target status is drawn first; vitals are then sampled from ranges
//! that land on the right side of the shared thresholds. A critical or
//! warning target always pushes at least one vital across its threshold.
//! `patientStatus` is finally recomputed from the sampled values with the
//! server's own evaluator, so the device and the worker always agree.

use chrono::Utc;
use rand::Rng;
use vitals_core::types::{Timestamp, PROCESSED_AT_FORMAT};
use vitals_core::{evaluate, Severity, TelemetryReading};

/// Draw the target status: `critical_rate` and `warning_rate` are
/// percentages, checked in that order.
pub fn pick_target<R: Rng>(warning_rate: f64, critical_rate: f64, rng: &mut R) -> Severity {
    let critical = critical_rate / 100.0;
    let warning = warning_rate / 100.0;
    let roll: f64 = rng.random();

    if roll < critical {
        Severity::Critical
    } else if roll < critical + warning {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

/// Generate a reading stamped with the current time.
pub fn generate<R: Rng>(
    device_id: &str,
    warning_rate: f64,
    critical_rate: f64,
    rng: &mut R,
) -> TelemetryReading {
    generate_at(device_id, warning_rate, critical_rate, rng, Utc::now())
}

/// Generate a reading stamped with `now`.
pub fn generate_at<R: Rng>(
    device_id: &str,
    warning_rate: f64,
    critical_rate: f64,
    rng: &mut R,
    now: Timestamp,
) -> TelemetryReading {
    let target = pick_target(warning_rate, critical_rate, rng);

    let mut reading = TelemetryReading::new(device_id, now.format(PROCESSED_AT_FORMAT).to_string());
    let (heart_rate, body_temperature, spo2) = primary_vitals(target, rng);
    reading.heart_rate = Some(heart_rate);
    reading.body_temperature = Some(body_temperature);
    reading.spo2 = Some(spo2);

    let (systolic, diastolic, respiratory) = secondary_vitals(target, rng);
    reading.blood_pressure_systolic = Some(systolic);
    reading.blood_pressure_diastolic = Some(diastolic);
    reading.respiratory_rate = Some(respiratory);

    reading.patient_status = evaluate(&reading).severity.as_str().to_string();
    reading
}

/// Integer sample in `lo..=hi`.
fn whole<R: Rng>(rng: &mut R, lo: u32, hi: u32) -> f64 {
    f64::from(rng.random_range(lo..=hi))
}

/// One-decimal sample in `lo..=hi`, given in tenths.
fn tenths<R: Rng>(rng: &mut R, lo: u32, hi: u32) -> f64 {
    f64::from(rng.random_range(lo..=hi)) / 10.0
}

/// Heart rate, body temperature and SpO2 for the target status.
fn primary_vitals<R: Rng>(target: Severity, rng: &mut R) -> (f64, f64, f64) {
    match target {
        Severity::Critical => {
            let mut hr = if rng.random_bool(0.5) { whole(rng, 121, 160) } else { whole(rng, 60, 99) };
            let mut temp = if rng.random_bool(0.5) { tenths(rng, 386, 400) } else { tenths(rng, 360, 374) };
            let mut spo2 = if rng.random_bool(0.5) { whole(rng, 80, 89) } else { whole(rng, 95, 100) };

            if hr <= 120.0 && temp <= 38.5 && spo2 >= 90.0 {
                match rng.random_range(0..3) {
                    0 => hr = whole(rng, 121, 160),
                    1 => temp = tenths(rng, 386, 400),
                    _ => spo2 = whole(rng, 80, 89),
                }
            }
            (hr, temp, spo2)
        }
        Severity::Warning => {
            let mut hr = if rng.random_bool(0.5) { whole(rng, 101, 120) } else { whole(rng, 60, 99) };
            let mut temp = if rng.random_bool(0.5) { tenths(rng, 376, 385) } else { tenths(rng, 360, 374) };
            let mut spo2 = if rng.random_bool(0.5) { whole(rng, 91, 94) } else { whole(rng, 95, 100) };

            if hr <= 100.0 && temp <= 37.5 && spo2 >= 95.0 {
                match rng.random_range(0..3) {
                    0 => hr = whole(rng, 101, 120),
                    1 => temp = tenths(rng, 376, 385),
                    _ => spo2 = whole(rng, 91, 94),
                }
            }
            (hr, temp, spo2)
        }
        Severity::Normal => (
            whole(rng, 60, 99),
            tenths(rng, 360, 374),
            whole(rng, 95, 100),
        ),
    }
}

/// Blood pressure and respiratory rate drift with the target status.
fn secondary_vitals<R: Rng>(target: Severity, rng: &mut R) -> (f64, f64, f64) {
    match target {
        Severity::Critical => (whole(rng, 140, 180), whole(rng, 90, 110), tenths(rng, 220, 300)),
        Severity::Warning => (whole(rng, 130, 150), whole(rng, 80, 95), tenths(rng, 180, 240)),
        Severity::Normal => (whole(rng, 110, 139), whole(rng, 70, 89), tenths(rng, 120, 179)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
