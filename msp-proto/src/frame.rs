//! Raw MSP v1/v2 frame byte layouts, the counterpart to `mav_proto::frame`.

use crate::crc::{crc8_dvb_s2, xor_checksum};

pub const MSP_HEADER_V1: [u8; 2] = *b"$M";
pub const MSP_HEADER_V2: [u8; 2] = *b"$X";
pub const MAX_PAYLOAD_V1: usize = u8::MAX as usize;
pub const MAX_PAYLOAD_V2: usize = u16::MAX as usize;

/// The byte following `$M`/`$X` that marks who is sending the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToFc,
    FromFc,
    Error,
}

impl Direction {
    pub fn as_byte(self) -> u8 {
        match self {
            Direction::ToFc => b'<',
            Direction::FromFc => b'>',
            Direction::Error => b'!',
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'<' => Some(Direction::ToFc),
            b'>' => Some(Direction::FromFc),
            b'!' => Some(Direction::Error),
            _ => None,
        }
    }
}

/// A fully assembled, checksum-verified MSP v1 frame.
#[derive(Debug, Clone)]
pub struct RawFrameV1 {
    pub direction: Direction,
    pub cmd: u8,
    pub payload: Vec<u8>,
    pub checksum: u8,
}

impl RawFrameV1 {
    pub fn encode(&self) -> Vec<u8> {
        let size = self.payload.len() as u8;
        let mut out = Vec::with_capacity(6 + self.payload.len());
        out.extend_from_slice(&MSP_HEADER_V1);
        out.push(self.direction.as_byte());
        out.push(size);
        out.push(self.cmd);
        out.extend_from_slice(&self.payload);
        out.push(xor_checksum(size, self.cmd, &self.payload));
        out
    }

    pub fn new(direction: Direction, cmd: u8, payload: Vec<u8>) -> Self {
        let checksum = xor_checksum(payload.len() as u8, cmd, &payload);
        Self {
            direction,
            cmd,
            payload,
            checksum,
        }
    }
}

/// A fully assembled, checksum-verified MSP v2 frame.
#[derive(Debug, Clone)]
pub struct RawFrameV2 {
    pub direction: Direction,
    pub flags: u8,
    pub cmd: u16,
    pub payload: Vec<u8>,
    pub checksum: u8,
}

impl RawFrameV2 {
    pub fn crc_span(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(5 + self.payload.len());
        v.push(self.flags);
        v.extend_from_slice(&self.cmd.to_le_bytes());
        v.extend_from_slice(&(self.payload.len() as u16).to_le_bytes());
        v.extend_from_slice(&self.payload);
        v
    }

    pub fn encode(&self) -> Vec<u8> {
        let span = self.crc_span();
        let mut out = Vec::with_capacity(6 + span.len());
        out.extend_from_slice(&MSP_HEADER_V2);
        out.push(self.direction.as_byte());
        out.extend_from_slice(&span);
        out.push(crc8_dvb_s2(&span));
        out
    }

    pub fn new(direction: Direction, flags: u8, cmd: u16, payload: Vec<u8>) -> Self {
        let mut frame = Self {
            direction,
            flags,
            cmd,
            payload,
            checksum: 0,
        };
        frame.checksum = crc8_dvb_s2(&frame.crc_span());
        frame
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
    pub fn direction(&self) -> Direction {
        match self {
            RawFrame::V1(f) => f.direction,
            RawFrame::V2(f) => f.direction,
        }
    }

    pub fn cmd(&self) -> u16 {
        match self {
            RawFrame::V1(f) => f.cmd as u16,
            RawFrame::V2(f) => f.cmd,
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
