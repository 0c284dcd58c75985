//! Fuzz target: `RawFrame` assembly and `Frame::decode`
//!
//! Treats the first byte as a layout selector and the rest as a bit
//! stream pushed one symbol at a time, then checks that decoding never
//! panics and that any accepted frame agrees with the bytes it came from.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use envsense::onewire::classify::Symbol;
use envsense::onewire::frame::{Frame, FrameFormat, RawFrame, checksum};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let format = if selector & 1 == 0 {
        FrameFormat::Bits40
    } else {
        FrameFormat::Bits48
    };

    // Whole-byte path.
    if let Some(raw) = RawFrame::from_bytes(format, rest) {
        let bytes = raw.bytes();
        let (body, sum) = bytes.split_at(bytes.len() - 1);
        match Frame::decode(&raw) {
            Ok(frame) => {
                assert_eq!(checksum(body), sum[0]);
                assert_eq!(frame.checksum, sum[0]);
                assert_eq!(frame.aux.is_some(), format == FrameFormat::Bits48);
            }
            Err(_) => assert_ne!(checksum(body), sum[0]),
        }
    }

    // Bit-at-a-time path, possibly short or overlong.
    let mut raw = RawFrame::new(format);
    let mut completed = false;
    for byte in rest {
        for shift in (0..8).rev() {
            let symbol = if byte >> shift & 1 == 1 {
                Symbol::One
            } else {
                Symbol::Zero
            };
            completed |= raw.push_bit(symbol);
        }
    }
    assert!(raw.bits_received() <= format.bit_count());
    assert_eq!(completed, raw.is_complete());
    if !raw.is_complete() {
        assert!(Frame::decode(&raw).is_err());
    }
});
