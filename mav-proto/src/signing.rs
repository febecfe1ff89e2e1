//! Signature passthrough. MAVLink v2 signing authenticates and timestamps a
//! frame with a shared secret; this crate recognizes the `SIGNED` incompat
//! flag and carries the 13-byte trailer through [`crate::frame::RawFrameV2`]
//! but never computes or validates it (Non-goal — no cryptographic link
//! security here).

use crate::frame::RawFrameV2;

/// Always `true` when a signature trailer is present: there is no
/// validation step to fail. Exists so callers have one place to wire in
/// real verification later without touching the parser.
pub fn accept_unconditionally(frame: &RawFrameV2) -> bool {
    frame.signature.is_some() || !frame.is_signed()
}
