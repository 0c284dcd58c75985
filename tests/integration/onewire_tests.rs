//! Integration tests for the single-wire decoder against the simulated
//! sensor: full transactions, error recovery, and alternate frame layouts.

use envsense::adapters::sim::Fault;
use envsense::error::{Busy, OneWireError};
use envsense::onewire::frame::{FrameFormat, RawFrame};
use envsense::onewire::{DecoderState, ReadStatus};

use crate::mock_hw::sim_decoder;

// ── Decoding ──────────────────────────────────────────────────

#[test]
fn fabricated_frame_decodes_to_its_values() {
    let mut d = sim_decoder(RawFrame::encode(FrameFormat::Bits40, 652, 351, 0), None);
    d.request().unwrap();
    let ReadStatus::Ready(frame) = d.poll() else {
        panic!("expected a frame, got {:?}", d.state());
    };
    assert_eq!(frame.relative_humidity, 652);
    assert_eq!(frame.temperature, 351);
    assert_eq!(frame.aux, None);
}

#[test]
fn sign_bit_recovers_negative_temperature() {
    let raw = RawFrame::from_bytes(FrameFormat::Bits40, &[0x02, 0x8C, 0x80, 0x65, 0x73]).unwrap();
    let mut d = sim_decoder(raw, None);
    d.request().unwrap();
    match d.poll() {
        ReadStatus::Ready(frame) => {
            assert_eq!(frame.relative_humidity, 652);
            assert_eq!(frame.temperature, -101);
        }
        other => panic!("expected frame, got {other:?}"),
    }
}

#[test]
fn wide_frame_carries_aux_byte() {
    let mut d = sim_decoder(RawFrame::encode(FrameFormat::Bits48, 400, -15, 0x2A), None);
    d.request().unwrap();
    match d.poll() {
        ReadStatus::Ready(frame) => {
            assert_eq!(frame.format, FrameFormat::Bits48);
            assert_eq!(frame.temperature, -15);
            assert_eq!(frame.aux, Some(0x2A));
        }
        other => panic!("expected frame, got {other:?}"),
    }
}

#[test]
fn corrupted_data_byte_fails_checksum() {
    let mut raw = RawFrame::encode(FrameFormat::Bits40, 500, 200, 0);
    raw.flip_bit(9);
    let mut d = sim_decoder(raw, None);
    d.request().unwrap();
    assert_eq!(d.poll(), ReadStatus::Failed(OneWireError::ChecksumInvalid));
}

// ── Request gating ────────────────────────────────────────────

#[test]
fn request_mid_decode_is_busy_and_leaves_state() {
    let mut d = sim_decoder(RawFrame::encode(FrameFormat::Bits40, 1, 1, 0), None);
    d.request().unwrap();
    for _ in 0..5 {
        d.step();
    }
    let before = d.state();
    assert!(before.is_in_flight(), "should be mid-frame, got {before:?}");
    assert_eq!(d.request(), Err(Busy));
    assert_eq!(d.state(), before);

    // The interrupted transaction still completes.
    assert!(matches!(d.poll(), ReadStatus::Ready(_)));
}

// ── Recovery ──────────────────────────────────────────────────

#[test]
fn stuck_low_after_ack_then_recovers_after_reset() {
    let mut d = sim_decoder(
        RawFrame::encode(FrameFormat::Bits40, 321, 123, 0),
        Some(Fault::StuckLowAfterAck),
    );
    d.request().unwrap();
    assert_eq!(d.step(), DecoderState::AwaitingAckLow);
    assert_eq!(d.step(), DecoderState::AwaitingAckHigh);
    assert_eq!(d.step(), DecoderState::Error(OneWireError::StuckLow));

    d.reset();
    d.bus_mut().set_fault(None);
    d.request().unwrap();
    match d.poll() {
        ReadStatus::Ready(frame) => {
            assert_eq!(frame.relative_humidity, 321);
            assert_eq!(frame.temperature, 123);
        }
        other => panic!("expected recovery, got {other:?}"),
    }
    assert_eq!(d.bus().transactions(), 2);
}

#[test]
fn every_error_kind_is_recoverable() {
    let faults = [
        Fault::NoResponse,
        Fault::StuckLowAfterAck,
        Fault::StuckHighAfterBits(30),
        Fault::StuckLowAtBit(3),
    ];
    for fault in faults {
        let mut d = sim_decoder(RawFrame::encode(FrameFormat::Bits40, 10, 20, 0), Some(fault));
        d.request().unwrap();
        assert!(matches!(d.poll(), ReadStatus::Failed(_)), "{fault:?} should fail");
        d.reset();
        d.bus_mut().set_fault(None);
        d.request().unwrap();
        assert!(matches!(d.poll(), ReadStatus::Ready(_)), "{fault:?} should recover");
    }
}
