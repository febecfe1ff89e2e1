//! Raw frame byte layouts for MAVLink v1 and v2, mirroring
//! `MAVLinkV1MessageRaw`/`MAVLinkV2MessageRaw` from the upstream crate this
//! workspace is descended from, but as owned buffers the streaming parser in
//! [`crate::parser`] fills incrementally rather than views over a
//! synchronous reader.

use crate::message::{MavHeader, MavlinkVersion, MAV_STX, MAV_STX_V2};

pub const V1_HEADER_LEN: usize = 6;
pub const V2_HEADER_LEN: usize = 10;
pub const SIGNATURE_LEN: usize = 13;

/// A fully assembled, CRC-checked v1 frame, still in wire field order.
#[derive(Debug, Clone)]
pub struct RawFrameV1 {
    pub len: u8,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub msg_id: u8,
    pub payload: Vec<u8>,
    pub checksum: u16,
}

impl RawFrameV1 {
    pub fn header(&self) -> MavHeader {
        MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence,
        }
    }

    /// Bytes covered by the CRC: length through the end of the payload.
    pub fn crc_span(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(5 + self.payload.len());
        v.push(self.len);
        v.push(self.sequence);
        v.push(self.system_id);
        v.push(self.component_id);
        v.push(self.msg_id);
        v.extend_from_slice(&self.payload);
        v
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(V1_HEADER_LEN + self.payload.len() + 2);
        out.push(MAV_STX);
        out.extend_from_slice(&self.crc_span());
        out.extend_from_slice(&self.checksum.to_le_bytes());
        out
    }
}

bitflags::bitflags! {
    /// v2 `incompat_flags`: a peer that doesn't understand a set bit MUST
    /// reject the frame (spec.md invariant I2). Only `SIGNED` is assigned by
    /// upstream MAVLink; unknown bits are rejected by
    /// [`crate::parser::FrameParser`] regardless.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IncompatFlags: u8 {
        const SIGNED = 0x01;
    }
}

bitflags::bitflags! {
    /// v2 `compat_flags`: unknown bits are ignored, never rejected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CompatFlags: u8 {
        const _ = !0;
    }
}

/// A fully assembled, CRC-checked v2 frame. Signed frames retain their
/// trailing 13-byte signature but it is never validated (spec.md Non-goal:
/// no cryptographic signing support).
#[derive(Debug, Clone)]
pub struct RawFrameV2 {
    pub len: u8,
    pub incompat_flags: IncompatFlags,
    pub compat_flags: CompatFlags,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub msg_id: u32,
    pub payload: Vec<u8>,
    pub checksum: u16,
    pub signature: Option<[u8; SIGNATURE_LEN]>,
}

impl RawFrameV2 {
    pub fn header(&self) -> MavHeader {
        MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.incompat_flags.contains(IncompatFlags::SIGNED)
    }

    /// Bytes covered by the CRC: length through the end of the payload
    /// (the 3-byte little-endian message id included, as MAVLink v2 spec).
    pub fn crc_span(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(9 + self.payload.len());
        v.push(self.len);
        v.push(self.incompat_flags.bits());
        v.push(self.compat_flags.bits());
        v.push(self.sequence);
        v.push(self.system_id);
        v.push(self.component_id);
        let id_bytes = self.msg_id.to_le_bytes();
        v.extend_from_slice(&id_bytes[..3]);
        v.extend_from_slice(&self.payload);
        v
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(V2_HEADER_LEN + self.payload.len() + 2 + SIGNATURE_LEN);
        out.push(MAV_STX_V2);
        out.extend_from_slice(&self.crc_span());
        out.extend_from_slice(&self.checksum.to_le_bytes());
        if let Some(sig) = &self.signature {
            out.extend_from_slice(sig);
        }
        out
    }
}

/// Either wire version of an assembled frame, as handed to callers of the
/// streaming parser.
#[derive(Debug, Clone)]
pub enum RawFrame {
    V1(RawFrameV1),
    V2(RawFrameV2),
}

impl RawFrame {
    pub fn version(&self) -> MavlinkVersion {
        match self {
            RawFrame::V1(_) => MavlinkVersion::V1,
            RawFrame::V2(_) => MavlinkVersion::V2,
        }
    }

    pub fn header(&self) -> MavHeader {
        match self {
            RawFrame::V1(f) => f.header(),
            RawFrame::V2(f) => f.header(),
        }
    }

    pub fn msg_id(&self) -> u32 {
        match self {
            RawFrame::V1(f) => f.msg_id as u32,
            RawFrame::V2(f) => f.msg_id,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            RawFrame::V1(f) => &f.payload,
            RawFrame::V2(f) => &f.payload,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            RawFrame::V1(f) => f.encode(),
            RawFrame::V2(f) => f.encode(),
        }
    }
}
