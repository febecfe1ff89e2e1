//! A message encoded as v1 and v2 must decode to the same value regardless
//! of which wire version carried it (P5).

use mav_proto::dialect::common::{Attitude, MavMessage};
use mav_proto::{decode_frame, encode_frame, FrameParser, MavHeader, MavlinkVersion, ParseEvent};

fn parse_one(wire: &[u8]) -> MavMessage {
    let mut parser = FrameParser::new();
    let mut events = Vec::new();
    parser.feed(wire, &mav_proto::CommonDialect, &mut events);
    let ParseEvent::Frame(frame) = &events[0] else {
        panic!("expected a complete frame, got {events:?}");
    };
    decode_frame(frame).unwrap()
}

#[test]
fn attitude_decodes_identically_from_v1_and_v2() {
    let header = MavHeader::default();
    let msg = MavMessage::Attitude(Attitude {
        time_boot_ms: 12_345,
        roll: 0.1,
        pitch: -0.2,
        yaw: 1.5,
        rollspeed: 0.0,
        pitchspeed: 0.0,
        yawspeed: 0.01,
    });

    let v1 = encode_frame(header, MavlinkVersion::V1, &msg);
    let v2 = encode_frame(header, MavlinkVersion::V2, &msg);

    assert_eq!(parse_one(&v1), msg);
    assert_eq!(parse_one(&v2), msg);
}

#[test]
fn attitude_at_rest_truncates_to_an_empty_v2_payload_and_still_decodes() {
    // Every field zero trims the v2 payload down to nothing (P2): MIN_LEN
    // and MAX_LEN are both 28 for ATTITUDE, but a sender may still omit the
    // whole trailing run of zero bytes.
    let header = MavHeader::default();
    let msg = MavMessage::Attitude(Attitude {
        time_boot_ms: 0,
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
        rollspeed: 0.0,
        pitchspeed: 0.0,
        yawspeed: 0.0,
    });

    let v2 = encode_frame(header, MavlinkVersion::V2, &msg);
    assert_eq!(parse_one(&v2), msg);
}
