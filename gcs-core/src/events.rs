//! The public event and request surface of spec.md §6, the seam the
//! renderer/UI collaborator sits behind. Named types only — no behavior
//! lives here.

use crate::error::GcsError;
use crate::session::SessionState;
use crate::telemetry::{TelemetryCategory, VehicleState};
use crate::transfer::mission::MissionItemSpec;
use mav_proto::dialect::common::{MavMissionType, MavResult};

/// Emitted by the session dispatcher; the sole channel through which
/// external layers observe state (spec.md §9: "external observers
/// subscribe instead of mutating").
#[derive(Debug, Clone)]
pub enum GcsEvent {
    ConnectionStateChanged {
        state: SessionState,
        identity: Option<crate::telemetry::Identity>,
    },
    TelemetryUpdated {
        category: TelemetryCategory,
        snapshot: VehicleState,
    },
    /// Optional diagnostic feed; disabled by default (see
    /// [`crate::session::SessionHandle::set_message_feed`]).
    MessageReceived {
        name: &'static str,
        id: u32,
        sys: u8,
        comp: u8,
    },
    ParameterProgress {
        seen: u32,
        total: u32,
    },
    ParameterCompleted,
    ParameterError(ParameterError),
    MissionProgress {
        seq: u16,
        total: u16,
    },
    /// The downloaded items for a completed `DownloadMission`; `None` when
    /// an `UploadMission` completed instead (the caller already holds the
    /// items it uploaded).
    MissionCompleted {
        items: Option<Vec<MissionItemSpec>>,
    },
    MissionFailed {
        ack: u8,
    },
    CommandAcknowledged {
        command: u16,
        result: MavResult,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    MissingIndex(u16),
    SetRejected { name: String },
}

/// Requests external layers issue into the session (spec.md §6).
#[derive(Debug, Clone)]
pub enum GcsRequest {
    Connect,
    Disconnect,
    SetTelemetryRate(crate::config::RateProfile),
    FetchParameters,
    SetParameter { name: String, value: f32 },
    DownloadMission { mission_type: MavMissionType },
    UploadMission { items: Vec<MissionItemSpec>, mission_type: MavMissionType },
    ExecuteCommand { command: u16, params: [f32; 7], use_int: bool, x: i32, y: i32 },
    StartRcOverride,
    StopRcOverride,
    SetRcChannel { index: usize, value: u16 },
}

pub type EventResult<T> = std::result::Result<T, GcsError>;
