//! The `Message` trait ties the registry (id <-> name <-> CRC_EXTRA <->
//! (de)serializer) together behind one type per the active dialect, the way
//! `mavlink-core::Message` does for a generated dialect enum. Here the one
//! dialect is [`crate::dialect::common::MavMessage`].

use crate::error::ParserError;

/// Metadata from a MAVLink packet header (sequence is per-sender, modulo
/// 256; gaps are counted, not treated as errors — invariant I3).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MavHeader {
    pub system_id: u8,
    pub component_id: u8,
    pub sequence: u8,
}

impl Default for MavHeader {
    /// The conventional GCS identity: sysid 255 / compid 190.
    fn default() -> Self {
        Self {
            system_id: 255,
            component_id: 190,
            sequence: 0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MavlinkVersion {
    V1,
    V2,
}

pub const MAV_STX: u8 = 0xFE;
pub const MAV_STX_V2: u8 = 0xFD;
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Implemented once per concrete message type (`Heartbeat`, `ParamValue`,
/// ...); `MavMessage::ser`/`parse` dispatch to these.
pub trait MessageData: Sized {
    const ID: u32;
    const NAME: &'static str;
    const EXTRA_CRC: u8;
    const MIN_LEN: usize;
    const MAX_LEN: usize;

    /// Write the canonical-order payload into `buf`, returning the number
    /// of bytes written (the truncated length for v2; v1 always writes
    /// `MAX_LEN`, the frame writer below re-truncates for v2 on the wire).
    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize;

    /// Parse from a payload already zero-extended to `MAX_LEN` (v2
    /// trailing-zero truncation tolerance, invariant-adjacent to P2).
    fn deser(version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError>;
}

/// The dialect-wide union of messages, plus the passthrough `Unknown`
/// variant used for ids with no registry entry (§4.1: surfaced as a
/// diagnostic event rather than dropped).
pub trait Message: Sized {
    fn message_id(&self) -> u32;
    fn message_name(&self) -> &'static str;
    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize;
    fn parse(version: MavlinkVersion, id: u32, payload: &[u8]) -> Result<Self, ParserError>;
    /// `None` for the `Unknown` passthrough variant: there is no CRC_EXTRA
    /// to check because there is no registry entry.
    fn extra_crc(id: u32) -> Option<u8>;
}

/// Zero-extend (or truncate) `payload` into a fixed `MAX_LEN`-sized buffer,
/// implementing MAVLink v2's trailing-zero-byte truncation (and tolerance
/// of v1 senders omitting extension fields) per spec.md invariant/property
/// P2.
pub fn zero_extend<const MAX_LEN: usize>(payload: &[u8]) -> [u8; MAX_LEN] {
    let mut buf = [0u8; MAX_LEN];
    let n = payload.len().min(MAX_LEN);
    buf[..n].copy_from_slice(&payload[..n]);
    buf
}

/// Trim trailing zero bytes off an encoded payload down to (but not below)
/// `min_len`, implementing the v2 wire-size optimization.
pub fn trim_trailing_zeroes(buf: &[u8], min_len: usize) -> usize {
    let mut len = buf.len();
    while len > min_len && buf[len - 1] == 0 {
        len -= 1;
    }
    len
}
