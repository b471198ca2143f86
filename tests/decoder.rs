#![allow(missing_docs)]
//! Host-level tests for the packet state machine.

mod common;

use common::packet;
use servo_arm::config::SERVO_COUNT;
use servo_arm::decoder::{DecoderState, PacketDecoder, PacketError};
use servo_arm::packet::ServoCommand;

type Outcome = Option<Result<ServoCommand, PacketError>>;

fn feed_all(decoder: &mut PacketDecoder<SERVO_COUNT>, bytes: &[u8]) -> Vec<Outcome> {
    bytes.iter().map(|&byte| decoder.feed(byte)).collect()
}

#[test]
fn transitions_follow_the_table() {
    use DecoderState::{AwaitingAngle, AwaitingChecksum, AwaitingHeader, AwaitingIndex};

    assert_eq!(AwaitingHeader.next(0xFF), AwaitingIndex);
    assert_eq!(AwaitingHeader.next(0x00), AwaitingHeader);
    assert_eq!(AwaitingHeader.next(0xFE), AwaitingHeader);
    for byte in [0x00, 0x7F, 0xFF] {
        assert_eq!(AwaitingIndex.next(byte), AwaitingAngle);
        assert_eq!(AwaitingAngle.next(byte), AwaitingChecksum);
        assert_eq!(AwaitingChecksum.next(byte), AwaitingHeader);
    }
}

#[test]
fn starts_awaiting_header() {
    let decoder = PacketDecoder::<SERVO_COUNT>::new();
    assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
    assert_eq!(DecoderState::default(), DecoderState::AwaitingHeader);
}

#[test]
fn every_valid_command_is_accepted_once() {
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    for index in 0..SERVO_COUNT as u8 {
        for angle in 0..=180 {
            let outcomes = feed_all(&mut decoder, &packet(index, angle));
            assert!(outcomes[..3].iter().all(Option::is_none));
            assert_eq!(outcomes[3], Some(Ok(ServoCommand { index, angle })));
            assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
        }
    }
}

#[test]
fn concrete_packet_and_off_by_one_checksum() {
    // (255 + 2 + 90) & 0xFF = 347 & 0xFF = 0x5B
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    let outcomes = feed_all(&mut decoder, &[0xFF, 0x02, 0x5A, 0x5B]);
    assert_eq!(outcomes[3], Some(Ok(ServoCommand { index: 2, angle: 90 })));

    for bad in [0x5A, 0x5C] {
        let outcomes = feed_all(&mut decoder, &[0xFF, 0x02, 0x5A, bad]);
        assert_eq!(
            outcomes[3],
            Some(Err(PacketError::ChecksumMismatch {
                expected: 0x5B,
                received: bad,
            }))
        );
        assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
    }
}

#[test]
fn any_wrong_checksum_is_rejected_and_resets() {
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    for (index, angle) in [(0, 0), (3, 45), (5, 180), (200, 250)] {
        let good = packet(index, angle)[3];
        for received in (0..=u8::MAX).filter(|&byte| byte != good) {
            let outcome = feed_all(&mut decoder, &[0xFF, index, angle, received])[3];
            assert!(matches!(
                outcome,
                Some(Err(PacketError::ChecksumMismatch { .. }))
            ));
            assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
        }
    }
}

#[test]
fn checksum_valid_but_out_of_range_is_rejected() {
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    for (index, angle) in [(6, 90), (0xFE, 0), (0, 181), (2, 0xFF), (6, 181)] {
        let outcome = feed_all(&mut decoder, &packet(index, angle))[3];
        assert_eq!(
            outcome,
            Some(Err(PacketError::InvalidDataRange { index, angle }))
        );
        assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
    }
}

#[test]
fn range_check_follows_servo_count() {
    let mut one_servo = PacketDecoder::<1>::new();
    let outcomes: Vec<_> = packet(1, 90).iter().map(|&b| one_servo.feed(b)).collect();
    assert_eq!(
        outcomes[3],
        Some(Err(PacketError::InvalidDataRange { index: 1, angle: 90 }))
    );
}

#[test]
fn noise_before_header_is_dropped() {
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    let [header, index, angle, checksum] = packet(2, 0x5A);
    let outcomes = feed_all(&mut decoder, &[0x01, header, index, angle, checksum]);
    assert!(outcomes[..4].iter().all(Option::is_none));
    assert_eq!(outcomes[4], Some(Ok(ServoCommand { index: 2, angle: 90 })));

    let outcomes = feed_all(&mut decoder, &[0x00, 0x10, 0xFE, 0x42]);
    assert!(outcomes.iter().all(Option::is_none));
    assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
}

#[test]
fn lost_byte_misframes_until_checksum_catches_it() {
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    // Angle byte of the first packet is lost; the next packet's header completes it.
    let [header, index, _lost, checksum] = packet(1, 30);
    let mut stream = vec![header, index, checksum];
    stream.extend_from_slice(&packet(4, 120));
    let outcomes = feed_all(&mut decoder, &stream);

    let completed: Vec<_> = outcomes.into_iter().flatten().collect();
    assert_eq!(completed.len(), 1);
    assert!(matches!(
        completed[0],
        Err(PacketError::ChecksumMismatch { .. })
    ));
    // The rest of the second packet has no header left and is dropped as noise.
    assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
}

#[test]
fn reset_abandons_partial_packet() {
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    feed_all(&mut decoder, &[0xFF, 0x01]);
    assert_eq!(decoder.state(), DecoderState::AwaitingAngle);

    decoder.reset();
    assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
    let outcomes = feed_all(&mut decoder, &packet(3, 10));
    assert_eq!(outcomes[3], Some(Ok(ServoCommand { index: 3, angle: 10 })));
}

#[test]
fn header_byte_inside_packet_is_data() {
    let mut decoder = PacketDecoder::<SERVO_COUNT>::new();
    // 0xFF as the index is data, not a new header; it fails the range check.
    let outcome = feed_all(&mut decoder, &packet(0xFF, 0xFF))[3];
    assert_eq!(
        outcome,
        Some(Err(PacketError::InvalidDataRange {
            index: 0xFF,
            angle: 0xFF,
        }))
    );
}

#[test]
fn error_text_matches_status_lines() {
    let mismatch = PacketError::ChecksumMismatch {
        expected: 1,
        received: 2,
    };
    let range = PacketError::InvalidDataRange { index: 9, angle: 0 };
    assert_eq!(mismatch.to_string(), "Checksum mismatch");
    assert_eq!(range.to_string(), "Invalid data range");
}
