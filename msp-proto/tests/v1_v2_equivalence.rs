//! A command encoded as MSP v1 or v2 decodes to the same value regardless
//! of wire version, for any command whose payload fits in v1's 255-byte
//! limit.

use msp_proto::commands::{FcVariant, MspMessage};
use msp_proto::{decode_frame, encode_v1, encode_v2, Direction, FrameParser, ParseEvent};

fn parse_one(wire: &[u8]) -> MspMessage {
    let mut parser = FrameParser::new();
    let mut events = Vec::new();
    parser.feed(wire, &mut events);
    let ParseEvent::Frame(frame) = &events[0] else {
        panic!("expected a complete frame, got {events:?}");
    };
    decode_frame(frame).unwrap()
}

#[test]
fn fc_variant_decodes_identically_from_v1_and_v2() {
    let msg = MspMessage::FcVariant(FcVariant {
        identifier: *b"BTFL",
    });

    let v1 = encode_v1(Direction::FromFc, &msg);
    let v2 = encode_v2(Direction::FromFc, 0, &msg);

    assert_eq!(parse_one(&v1), msg);
    assert_eq!(parse_one(&v2), msg);
}
