//! MAVLink v1/v2 wire codec: framing, CRC, and a hand-authored subset of the
//! `common` dialect's message registry. See `SPEC_FULL.md` in the workspace
//! root for the module-by-module design this crate implements.

pub mod bytes;
pub mod crc;
pub mod dialect;
pub mod error;
pub mod frame;
pub mod message;
pub mod parser;
pub mod signing;

pub use dialect::common::MavMessage;
pub use error::{FrameError, ParserError};
pub use frame::{CompatFlags, IncompatFlags, RawFrame, RawFrameV1, RawFrameV2};
pub use message::{MavHeader, MavlinkVersion, Message, MessageData};
pub use parser::{ExtraCrcLookup, FrameParser, ParseEvent};

use crc::calculate_crc;

/// `ExtraCrcLookup` for the `common` dialect, used by [`FrameParser`] and
/// wired up by default for every link in `gcs-core`.
pub struct CommonDialect;

impl ExtraCrcLookup for CommonDialect {
    fn extra_crc(&self, id: u32) -> Option<u8> {
        MavMessage::extra_crc(id)
    }
}

/// Encode a message into a complete, checksummed wire frame. `header.sequence`
/// is used as-is; callers own sequence-number bookkeeping (invariant I3).
pub fn encode_frame(header: MavHeader, version: MavlinkVersion, msg: &MavMessage) -> Vec<u8> {
    let id = msg.message_id();
    let extra = MavMessage::extra_crc(id).unwrap_or(0);
    let mut payload_buf = [0u8; message::MAX_PAYLOAD_LEN];
    let written = msg.ser(version, &mut payload_buf);

    match version {
        MavlinkVersion::V1 => {
            let payload = payload_buf[..written].to_vec();
            let mut frame = RawFrameV1 {
                len: payload.len() as u8,
                sequence: header.sequence,
                system_id: header.system_id,
                component_id: header.component_id,
                msg_id: id as u8,
                payload,
                checksum: 0,
            };
            frame.checksum = calculate_crc(&frame.crc_span(), extra);
            frame.encode()
        }
        MavlinkVersion::V2 => {
            let trimmed = message::trim_trailing_zeroes(&payload_buf[..written], 0);
            let payload = payload_buf[..trimmed].to_vec();
            let mut frame = RawFrameV2 {
                len: payload.len() as u8,
                incompat_flags: IncompatFlags::empty(),
                compat_flags: CompatFlags::empty(),
                sequence: header.sequence,
                system_id: header.system_id,
                component_id: header.component_id,
                msg_id: id,
                payload,
                checksum: 0,
                signature: None,
            };
            frame.checksum = calculate_crc(&frame.crc_span(), extra);
            frame.encode()
        }
    }
}

/// Decode an assembled [`RawFrame`] (as produced by [`FrameParser`]) into a
/// dialect message.
pub fn decode_frame(frame: &RawFrame) -> Result<MavMessage, ParserError> {
    MavMessage::parse(frame.version(), frame.msg_id(), frame.payload())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialect::common::Heartbeat;

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> Vec<ParseEvent> {
        let mut out = Vec::new();
        parser.feed(bytes, &CommonDialect, &mut out);
        out
    }

    #[test]
    fn heartbeat_round_trips_v2_through_encode_and_parser() {
        let header = MavHeader {
            system_id: 1,
            component_id: 1,
            sequence: 7,
        };
        let msg = MavMessage::Heartbeat(Heartbeat {
            custom_mode: 0,
            mav_type: 2,
            autopilot: 3,
            base_mode: 0x81,
            system_status: 4,
            mavlink_version: 3,
        });
        let wire = encode_frame(header, MavlinkVersion::V2, &msg);

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &wire);
        assert_eq!(events.len(), 1);
        let ParseEvent::Frame(frame) = &events[0] else {
            panic!("expected a complete frame");
        };
        let decoded = decode_frame(frame).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn heartbeat_round_trips_v1() {
        let header = MavHeader::default();
        let msg = MavMessage::Heartbeat(Heartbeat {
            custom_mode: 1,
            mav_type: 1,
            autopilot: 3,
            base_mode: 0,
            system_status: 3,
            mavlink_version: 3,
        });
        let wire = encode_frame(header, MavlinkVersion::V1, &msg);
        assert_eq!(wire[0], message::MAV_STX);

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &wire);
        let ParseEvent::Frame(frame) = &events[0] else {
            panic!("expected a complete frame");
        };
        assert_eq!(decode_frame(frame).unwrap(), msg);
    }

    #[test]
    fn corrupted_checksum_is_reported_and_parser_resyncs_on_next_frame() {
        let header = MavHeader::default();
        let msg = MavMessage::Heartbeat(Heartbeat {
            custom_mode: 0,
            mav_type: 0,
            autopilot: 0,
            base_mode: 0,
            system_status: 0,
            mavlink_version: 3,
        });
        let mut wire = encode_frame(header, MavlinkVersion::V2, &msg);
        let last = wire.len() - 1;
        wire[last] ^= 0xFF; // flip a checksum bit

        let mut good = encode_frame(header, MavlinkVersion::V2, &msg);
        let mut stream = wire;
        stream.append(&mut good);

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &stream);
        assert!(matches!(events[0], ParseEvent::CrcMismatch { .. }));
        assert!(matches!(events[1], ParseEvent::Frame(_)));
    }
}
