//! Push-based streaming MSP v1/v2 frame parser — the MSP-side counterpart
//! of `mav_proto::parser::FrameParser`, same non-blocking, no-per-byte-
//! allocation shape (SPEC_FULL.md §5.2's redesign note applies here too).

use crate::crc::{crc8_dvb_s2, xor_checksum};
use crate::frame::{Direction, RawFrame, RawFrameV1, RawFrameV2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Scanning for `$`.
    IdleScanning,
    /// Just saw `$`; next byte picks v1 (`M`) or v2 (`X`).
    SawDollar,
    /// Next byte is the direction (`<`, `>`, `!`).
    AwaitDirection { v2: bool },
    /// v1: reading `size`. v2: reading `flags`.
    V1Size,
    V1Cmd,
    V1Payload,
    V1Checksum,
    V2Flags,
    V2CmdLo,
    V2CmdHi,
    V2SizeLo,
    V2SizeHi,
    V2Payload,
    V2Checksum,
}

/// One resolved event out of [`FrameParser::feed`].
#[derive(Debug, Clone)]
pub enum ParseEvent {
    Frame(RawFrame),
    /// The trailing checksum byte didn't match. The parser has already
    /// resynchronized past it by the time this is emitted.
    ChecksumMismatch { cmd: u16 },
    /// An MSP v1 error frame (`direction == '!'`) was received; carries the
    /// command code and whatever payload bytes accompanied it.
    ErrorResponse { cmd: u16, payload: Vec<u8> },
}

/// Streaming MSP v1/v2 frame parser, one instance per link.
pub struct FrameParser {
    state: State,
    direction: Option<Direction>,
    need: usize,
    size: u16,
    flags: u8,
    cmd: u16,
    /// Low byte of whichever two-byte little-endian field is half-read
    /// (`cmd` then `size` for v2 headers).
    lo_byte: u8,
    payload: Vec<u8>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            state: State::IdleScanning,
            direction: None,
            need: 0,
            size: 0,
            flags: 0,
            cmd: 0,
            lo_byte: 0,
            payload: Vec::with_capacity(256),
        }
    }

    fn reset(&mut self) {
        self.state = State::IdleScanning;
        self.direction = None;
    }

    /// Feed a chunk of bytes (any length, including zero) and drain as many
    /// events as the chunk yields.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<ParseEvent>) {
        for &byte in chunk {
            self.feed_byte(byte, out);
        }
    }

    fn feed_byte(&mut self, byte: u8, out: &mut Vec<ParseEvent>) {
        match self.state {
            State::IdleScanning => {
                if byte == b'$' {
                    self.state = State::SawDollar;
                }
                // Anything else: discarded, stay scanning (resync path).
            }
            State::SawDollar => match byte {
                b'M' => {
                    self.state = State::AwaitDirection { v2: false };
                }
                b'X' => {
                    self.state = State::AwaitDirection { v2: true };
                }
                b'$' => {} // stay, handles repeated '$' noise
                _ => self.reset(),
            },
            State::AwaitDirection { v2 } => match Direction::from_byte(byte) {
                Some(dir) => {
                    self.direction = Some(dir);
                    self.state = if v2 { State::V2Flags } else { State::V1Size };
                }
                None => self.reset(),
            },
            State::V1Size => {
                self.size = byte as u16;
                self.state = State::V1Cmd;
            }
            State::V1Cmd => {
                self.cmd = byte as u16;
                self.payload.clear();
                self.need = self.size as usize;
                self.state = if self.need == 0 {
                    State::V1Checksum
                } else {
                    State::V1Payload
                };
            }
            State::V1Payload => {
                self.payload.push(byte);
                self.need -= 1;
                if self.need == 0 {
                    self.state = State::V1Checksum;
                }
            }
            State::V1Checksum => {
                let expected = xor_checksum(self.size as u8, self.cmd as u8, &self.payload);
                if byte != expected {
                    out.push(ParseEvent::ChecksumMismatch { cmd: self.cmd });
                    self.reset();
                    return;
                }
                self.finish_v1(byte, out);
            }
            State::V2Flags => {
                self.flags = byte;
                self.state = State::V2CmdLo;
            }
            State::V2CmdLo => {
                self.lo_byte = byte;
                self.state = State::V2CmdHi;
            }
            State::V2CmdHi => {
                self.cmd = u16::from_le_bytes([self.lo_byte, byte]);
                self.state = State::V2SizeLo;
            }
            State::V2SizeLo => {
                self.lo_byte = byte;
                self.state = State::V2SizeHi;
            }
            State::V2SizeHi => {
                self.size = u16::from_le_bytes([self.lo_byte, byte]);
                self.payload.clear();
                self.need = self.size as usize;
                self.state = if self.need == 0 {
                    State::V2Checksum
                } else {
                    State::V2Payload
                };
            }
            State::V2Payload => {
                self.payload.push(byte);
                self.need -= 1;
                if self.need == 0 {
                    self.state = State::V2Checksum;
                }
            }
            State::V2Checksum => {
                let span = self.v2_crc_span();
                let expected = crc8_dvb_s2(&span);
                if byte != expected {
                    out.push(ParseEvent::ChecksumMismatch { cmd: self.cmd });
                    self.reset();
                    return;
                }
                self.finish_v2(byte, out);
            }
        }
    }

    fn v2_crc_span(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(5 + self.payload.len());
        v.push(self.flags);
        v.extend_from_slice(&self.cmd.to_le_bytes());
        v.extend_from_slice(&self.size.to_le_bytes());
        v.extend_from_slice(&self.payload);
        v
    }

    fn finish_v1(&mut self, checksum: u8, out: &mut Vec<ParseEvent>) {
        let direction = self.direction.unwrap();
        if direction == Direction::Error {
            out.push(ParseEvent::ErrorResponse {
                cmd: self.cmd,
                payload: std::mem::take(&mut self.payload),
            });
            self.reset();
            return;
        }
        out.push(ParseEvent::Frame(RawFrame::V1(RawFrameV1 {
            direction,
            cmd: self.cmd as u8,
            payload: std::mem::take(&mut self.payload),
            checksum,
        })));
        self.reset();
    }

    fn finish_v2(&mut self, checksum: u8, out: &mut Vec<ParseEvent>) {
        let direction = self.direction.unwrap();
        if direction == Direction::Error {
            out.push(ParseEvent::ErrorResponse {
                cmd: self.cmd,
                payload: std::mem::take(&mut self.payload),
            });
            self.reset();
            return;
        }
        out.push(ParseEvent::Frame(RawFrame::V2(RawFrameV2 {
            direction,
            flags: self.flags,
            cmd: self.cmd,
            payload: std::mem::take(&mut self.payload),
            checksum,
        })));
        self.reset();
    }
}
