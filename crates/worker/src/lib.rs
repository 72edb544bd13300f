//! Telemetry worker host library.
//!
//! Exposes the building blocks (config, state, error handling, ingress
//! envelope, routes) so integration tests and the binary entrypoint can
//! both access them.

pub mod config;
pub mod error;
pub mod ingress;
pub mod logging;
pub mod router;
pub mod routes;
pub mod state;
