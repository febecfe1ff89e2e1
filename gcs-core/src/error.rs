//! The error taxonomy of spec.md §7, as one layered `thiserror` enum —
//! following the pattern `roby2014-mavspec`'s `mavlib_core`/`mavspec`
//! crates use for their own layered error enums (SPEC_FULL.md §3), rather
//! than the hand-rolled `Display` impls `mav-proto`/`msp-proto` keep for
//! their own leaf-level codec errors.

use std::fmt;

/// The seven error kinds of spec.md §7. Transport and protocol errors are
/// recovered locally (logged, counted) and rarely escape to a caller;
/// transfer, precondition, and cancellation errors are always surfaced.
#[derive(Debug, thiserror::Error)]
pub enum GcsError {
    /// I/O failure, connect-refused, or EOF on a transport. Recovery is
    /// automatic reconnect; this variant is mostly useful for diagnostics.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// CRC mismatch, truncated frame, unknown incompat-flag, unknown magic.
    /// Counted and logged; traffic continues.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The message registry has no entry for an id, or the payload length
    /// fell outside `[min_len, max_len]`.
    #[error("decode error: {0}")]
    Decode(String),

    /// No response arrived within the deadline after all retries.
    #[error("transfer timed out after {retries} attempt(s): {detail}")]
    TransferTimeout { retries: u32, detail: String },

    /// An ack/response carried a non-success code.
    #[error("transfer rejected: {0}")]
    TransferRejected(String),

    /// The operation was attempted in the wrong session state (e.g.
    /// set-parameter while disconnected).
    #[error("precondition failed: {0}")]
    PrecondFailed(String),

    /// The operation was cancelled by the caller or by session shutdown.
    #[error("operation cancelled")]
    Cancelled,
}

impl GcsError {
    pub fn protocol(msg: impl fmt::Display) -> Self {
        Self::Protocol(msg.to_string())
    }

    pub fn decode(msg: impl fmt::Display) -> Self {
        Self::Decode(msg.to_string())
    }

    pub fn rejected(msg: impl fmt::Display) -> Self {
        Self::TransferRejected(msg.to_string())
    }

    pub fn precond(msg: impl fmt::Display) -> Self {
        Self::PrecondFailed(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GcsError>;
