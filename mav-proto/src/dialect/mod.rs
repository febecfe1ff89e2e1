//! The hand-authored registry standing in for a `mavlink-bindgen`-generated
//! dialect module: a subset of `common.xml` covering heartbeat/identity,
//! parameters, missions, commands, and the telemetry messages the rest of
//! this workspace consumes. See SPEC_FULL.md §3 for the scope decision.

pub mod common;

pub use common::MavMessage;
