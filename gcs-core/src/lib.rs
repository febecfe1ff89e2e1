//! Transport, session, transfer, and telemetry core (C4-C9) for a
//! MAVLink/MSP ground-control station, layered on [`mav_proto`] and
//! [`msp_proto`]. See `SPEC_FULL.md` in the workspace root for the
//! module-by-module design; external layers (the renderer UI, layout
//! persistence, SITL process launching) sit entirely outside this crate
//! and interact only through [`events::GcsEvent`]/[`events::GcsRequest`]
//! and [`session::SessionHandle`].

pub mod config;
pub mod error;
pub mod events;
pub mod link;
pub mod rc_override;
pub mod session;
pub mod telemetry;
pub mod transfer;
pub mod transport;

pub use config::{ProtocolKind, RateProfile, TransportConfig};
pub use error::{GcsError, Result};
pub use events::{GcsEvent, GcsRequest};
pub use session::{spawn, SessionHandle, SessionState};
pub use telemetry::{TelemetryCategory, VehicleState};
