//! Garbage bytes before, between, and inside candidate frames must never
//! wedge the parser: it always resynchronizes on the next valid frame
//! (the MSP counterpart of mav-proto's P4).

use msp_proto::commands::{Attitude, MspMessage};
use msp_proto::{decode_frame, encode_v2, Direction, FrameParser, ParseEvent};

fn attitude_frame(yaw: i16) -> Vec<u8> {
    let msg = MspMessage::Attitude(Attitude {
        roll_decideg: 0,
        pitch_decideg: 0,
        yaw_deg: yaw,
    });
    encode_v2(Direction::FromFc, 0, &msg)
}

#[test]
fn leading_garbage_is_discarded_without_losing_the_following_frame() {
    let mut stream = vec![0x00, 0xAA, 0x55, 0x24]; // noise with no '$' in it
    stream.extend(attitude_frame(90));

    let mut parser = FrameParser::new();
    let mut events = Vec::new();
    parser.feed(&stream, &mut events);

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ParseEvent::Frame(_)));
}

#[test]
fn garbage_between_two_valid_frames_does_not_corrupt_either() {
    let mut stream = attitude_frame(1);
    stream.extend([0x00, 0x11, 0x22, 0x33]);
    stream.extend(attitude_frame(2));

    let mut parser = FrameParser::new();
    let mut events = Vec::new();
    parser.feed(&stream, &mut events);

    let frames: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ParseEvent::Frame(_)))
        .collect();
    assert_eq!(frames.len(), 2);
}

#[test]
fn bytes_fed_one_at_a_time_produce_the_same_result_as_one_big_chunk() {
    let stream = attitude_frame(45);

    let mut whole = FrameParser::new();
    let mut whole_events = Vec::new();
    whole.feed(&stream, &mut whole_events);

    let mut piecewise = FrameParser::new();
    let mut piecewise_events = Vec::new();
    for &b in &stream {
        piecewise.feed(&[b], &mut piecewise_events);
    }

    assert_eq!(whole_events.len(), 1);
    assert_eq!(piecewise_events.len(), 1);

    let ParseEvent::Frame(frame) = &whole_events[0] else {
        panic!("expected a frame");
    };
    let decoded = decode_frame(frame).unwrap();
    let ParseEvent::Frame(frame2) = &piecewise_events[0] else {
        panic!("expected a frame");
    };
    assert_eq!(decoded, decode_frame(frame2).unwrap());
}

#[test]
fn dollar_sign_inside_noise_does_not_spuriously_start_a_frame() {
    let mut stream = vec![b'$', 0x00]; // '$' followed by a byte that is neither 'M' nor 'X'
    stream.extend(attitude_frame(10));

    let mut parser = FrameParser::new();
    let mut events = Vec::new();
    parser.feed(&stream, &mut events);

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ParseEvent::Frame(_)));
}
