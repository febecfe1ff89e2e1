//! Garbage bytes before, between, and inside candidate frames must never
//! wedge the parser: it always resynchronizes on the next valid frame (P4).

use mav_proto::dialect::common::{Heartbeat, MavMessage};
use mav_proto::{encode_frame, CommonDialect, FrameParser, MavHeader, MavlinkVersion, ParseEvent};

fn heartbeat_frame(seq: u8) -> Vec<u8> {
    let header = MavHeader {
        sequence: seq,
        ..MavHeader::default()
    };
    let msg = MavMessage::Heartbeat(Heartbeat {
        custom_mode: 0,
        mav_type: 2,
        autopilot: 3,
        base_mode: 0,
        system_status: 3,
        mavlink_version: 3,
    });
    encode_frame(header, MavlinkVersion::V2, &msg)
}

#[test]
fn leading_garbage_is_discarded_without_losing_the_following_frame() {
    let mut stream = vec![0x00, 0xAA, 0x55, 0x10]; // noise with no STX byte in it
    stream.extend(heartbeat_frame(1));

    let mut parser = FrameParser::new();
    let mut events = Vec::new();
    parser.feed(&stream, &CommonDialect, &mut events);

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ParseEvent::Frame(_)));
}

#[test]
fn garbage_between_two_valid_frames_does_not_corrupt_either() {
    let mut stream = heartbeat_frame(1);
    stream.extend([0x00, 0x11, 0x22, 0x33]); // non-STX noise, discarded byte by byte
    stream.extend(heartbeat_frame(2));

    let mut parser = FrameParser::new();
    let mut events = Vec::new();
    parser.feed(&stream, &CommonDialect, &mut events);

    let frames: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ParseEvent::Frame(_)))
        .collect();
    assert_eq!(frames.len(), 2);
}

#[test]
fn bytes_fed_one_at_a_time_produce_the_same_result_as_one_big_chunk() {
    let stream = heartbeat_frame(5);

    let mut whole = FrameParser::new();
    let mut whole_events = Vec::new();
    whole.feed(&stream, &CommonDialect, &mut whole_events);

    let mut piecewise = FrameParser::new();
    let mut piecewise_events = Vec::new();
    for &b in &stream {
        piecewise.feed(&[b], &CommonDialect, &mut piecewise_events);
    }

    assert_eq!(whole_events.len(), 1);
    assert_eq!(piecewise_events.len(), 1);
}
