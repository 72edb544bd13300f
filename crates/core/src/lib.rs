//! Pure domain logic for the vital-signs telemetry pipeline.
//!
//! Nothing in this crate performs I/O. The decoder, the severity evaluator
//! and the record builder are plain functions over owned values so they can
//! be tested in isolation and reused by the device simulator.

pub mod alert;
pub mod error;
pub mod metric_names;
pub mod record;
pub mod severity;
pub mod telemetry;
pub mod thresholds;
pub mod types;

pub use alert::AlertPayload;
pub use error::CoreError;
pub use record::ProcessedRecord;
pub use severity::{AlertCode, AlertQualifier, Severity};
pub use telemetry::TelemetryReading;
pub use thresholds::{evaluate, Evaluation};
