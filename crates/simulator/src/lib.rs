//! Simulated bedside device.
//!
//! - [`generate`]: one random reading whose status is drawn from the
//!   configured warning and critical rates.
//! - [`TelemetrySender`]: posts batches to a worker's invocation endpoint.

pub mod generator;
pub mod sender;

pub use generator::{generate, generate_at, pick_target};
pub use sender::{invocation_body, SendError, TelemetrySender};
