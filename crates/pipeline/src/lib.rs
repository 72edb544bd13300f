//! Batch orchestration for incoming telemetry.
//!
//! [`BatchRunner`] drives every message of a batch through
//! decode → evaluate → build record → publish → (critical only) notify,
//! strictly in order, and returns a [`BatchSummary`] of the counters.

pub mod error;
pub mod runner;

pub use error::MessageError;
pub use runner::{BatchRunner, BatchSummary};
