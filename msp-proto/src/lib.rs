//! MSP v1/v2 wire codec: framing, checksums, and a command registry
//! covering the identity/telemetry/RC subset this workspace speaks. See
//! `SPEC_FULL.md` in the workspace root for the module-by-module design.

pub mod bytes;
pub mod commands;
pub mod crc;
pub mod error;
pub mod frame;
pub mod message;
pub mod parser;

pub use commands::MspMessage;
pub use error::{FrameError, ParserError};
pub use frame::{Direction, RawFrame, RawFrameV1, RawFrameV2};
pub use message::Message;
pub use parser::{FrameParser, ParseEvent};

/// MSP v1 frames cap their payload at 255 bytes (one size byte); v2
/// callers that need more should request the v2 wire format instead.
const MAX_V1_PAYLOAD: usize = 255;

/// Encode a command into a complete, checksummed MSP v1 frame. Panics if
/// the encoded payload exceeds the v1 255-byte limit — callers pick v2 for
/// anything that can grow past it (e.g. long `MSP_MODE_RANGES` replies).
pub fn encode_v1(direction: Direction, msg: &MspMessage) -> Vec<u8> {
    let mut buf = [0u8; message::MAX_PAYLOAD_LEN];
    let written = msg.ser(&mut buf);
    assert!(written <= MAX_V1_PAYLOAD, "payload too large for MSP v1");
    RawFrameV1::new(direction, msg.code() as u8, buf[..written].to_vec()).encode()
}

/// Encode a command into a complete, checksummed MSP v2 frame.
pub fn encode_v2(direction: Direction, flags: u8, msg: &MspMessage) -> Vec<u8> {
    let mut buf = [0u8; message::MAX_PAYLOAD_LEN];
    let written = msg.ser(&mut buf);
    RawFrameV2::new(direction, flags, msg.code(), buf[..written].to_vec()).encode()
}

/// Decode an assembled [`RawFrame`] (as produced by [`FrameParser`]) into a
/// registry command.
pub fn decode_frame(frame: &RawFrame) -> Result<MspMessage, ParserError> {
    MspMessage::parse(frame.cmd(), frame.payload())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::Attitude;

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> Vec<ParseEvent> {
        let mut out = Vec::new();
        parser.feed(bytes, &mut out);
        out
    }

    #[test]
    fn attitude_round_trips_v1_through_encode_and_parser() {
        let msg = MspMessage::Attitude(Attitude {
            roll_decideg: 12,
            pitch_decideg: -34,
            yaw_deg: 270,
        });
        let wire = encode_v1(Direction::FromFc, &msg);

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &wire);
        assert_eq!(events.len(), 1);
        let ParseEvent::Frame(frame) = &events[0] else {
            panic!("expected a complete frame");
        };
        assert_eq!(decode_frame(frame).unwrap(), msg);
    }

    #[test]
    fn attitude_round_trips_v2_through_encode_and_parser() {
        let msg = MspMessage::Attitude(Attitude {
            roll_decideg: 1,
            pitch_decideg: 2,
            yaw_deg: 3,
        });
        let wire = encode_v2(Direction::FromFc, 0, &msg);

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &wire);
        assert_eq!(events.len(), 1);
        let ParseEvent::Frame(frame) = &events[0] else {
            panic!("expected a complete frame");
        };
        assert_eq!(decode_frame(frame).unwrap(), msg);
    }

    #[test]
    fn corrupted_v1_checksum_is_reported_and_parser_resyncs() {
        let msg = MspMessage::FcVariant(commands::FcVariant {
            identifier: *b"INAV",
        });
        let mut wire = encode_v1(Direction::FromFc, &msg);
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;

        let mut good = encode_v1(Direction::FromFc, &msg);
        let mut stream = wire;
        stream.append(&mut good);

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &stream);
        assert!(matches!(events[0], ParseEvent::ChecksumMismatch { .. }));
        assert!(matches!(events[1], ParseEvent::Frame(_)));
    }

    #[test]
    fn error_direction_frame_is_surfaced_distinctly() {
        let frame = RawFrameV1::new(Direction::Error, 105, vec![]);
        let wire = frame.encode();

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &wire);
        assert!(matches!(events[0], ParseEvent::ErrorResponse { cmd: 105, .. }));
    }
}
