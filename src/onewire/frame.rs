//! Frame layout and integrity check.
//!
//! ```text
//!  byte   0        1        2        3        4        5
//!        ┌────────┬────────┬────────┬────────┬────────┐
//!  40bit │ RH hi  │ RH lo  │ T hi   │ T lo   │ sum    │
//!        ├────────┼────────┼────────┼────────┼────────┼────────┐
//!  48bit │ RH hi  │ RH lo  │ T hi   │ T lo   │ aux    │ sum    │
//!        └────────┴────────┴────────┴────────┴────────┴────────┘
//! ```
//!
//! Bits arrive most-significant first.  `sum` is the low byte of the sum of
//! every preceding byte.  The top bit of `T hi` is a sign flag; the
//! remaining 15 bits are the magnitude in tenths of a degree.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use super::classify::Symbol;
use crate::error::OneWireError;

/// Largest supported frame in bytes.
pub const MAX_FRAME_BYTES: usize = 6;

const TEMP_SIGN: u16 = 0x8000;
const TEMP_MAGNITUDE: u16 = 0x7FFF;

/// Frame length variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    /// Humidity, temperature, checksum.
    #[default]
    Bits40,
    /// Humidity, temperature, one auxiliary byte, checksum.
    Bits48,
}

impl FrameFormat {
    pub const fn bit_count(self) -> u8 {
        match self {
            Self::Bits40 => 40,
            Self::Bits48 => 48,
        }
    }

    pub const fn byte_count(self) -> usize {
        self.bit_count() as usize / 8
    }
}

/// Truncated additive checksum.  Not a CRC: it catches any single corrupted
/// byte but misses compensating multi-byte errors.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

// ---------------------------------------------------------------------------
// RawFrame: bit sink filled by the decoder
// ---------------------------------------------------------------------------

/// Bytes as shifted in off the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    format: FrameFormat,
    bytes: Vec<u8, MAX_FRAME_BYTES>,
    bits: u8,
}

impl RawFrame {
    pub fn new(format: FrameFormat) -> Self {
        let mut bytes = Vec::new();
        // byte_count() never exceeds MAX_FRAME_BYTES.
        let _ = bytes.resize(format.byte_count(), 0);
        Self {
            format,
            bytes,
            bits: 0,
        }
    }

    /// Wrap a complete byte image.  `None` if the length does not match
    /// the format.
    pub fn from_bytes(format: FrameFormat, data: &[u8]) -> Option<Self> {
        if data.len() != format.byte_count() {
            return None;
        }
        let bytes = Vec::from_slice(data).ok()?;
        Some(Self {
            format,
            bytes,
            bits: format.bit_count(),
        })
    }

    /// Build a well-formed image from field values.
    pub fn encode(format: FrameFormat, relative_humidity: u16, temperature: i16, aux: u8) -> Self {
        let magnitude = temperature.unsigned_abs().min(TEMP_MAGNITUDE);
        let temp_raw = if temperature < 0 {
            TEMP_SIGN | magnitude
        } else {
            magnitude
        };
        let [rh_hi, rh_lo] = relative_humidity.to_be_bytes();
        let [t_hi, t_lo] = temp_raw.to_be_bytes();

        let mut bytes: Vec<u8, MAX_FRAME_BYTES> = Vec::new();
        let _ = bytes.extend_from_slice(&[rh_hi, rh_lo, t_hi, t_lo]);
        if format == FrameFormat::Bits48 {
            let _ = bytes.push(aux);
        }
        let sum = checksum(&bytes);
        let _ = bytes.push(sum);
        Self {
            format,
            bytes,
            bits: format.bit_count(),
        }
    }

    /// Shift one bit into byte `i / 8`, most-significant bit first.
    /// Returns `true` once the frame holds every bit; extra bits are
    /// ignored.
    pub fn push_bit(&mut self, symbol: Symbol) -> bool {
        if self.is_complete() {
            return true;
        }
        let index = self.bits as usize;
        let byte = &mut self.bytes[index / 8];
        *byte = (*byte << 1) | symbol.as_bit();
        self.bits += 1;
        self.is_complete()
    }

    /// Bit `index` of the image, most-significant first.
    pub fn bit(&self, index: usize) -> Symbol {
        let byte = self.bytes[index / 8];
        if byte & (0x80 >> (index % 8)) != 0 {
            Symbol::One
        } else {
            Symbol::Zero
        }
    }

    pub fn bits_received(&self) -> u8 {
        self.bits
    }

    pub fn is_complete(&self) -> bool {
        self.bits >= self.format.bit_count()
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Flip one bit; used to fabricate corrupted frames.
    pub fn flip_bit(&mut self, index: usize) {
        self.bytes[index / 8] ^= 0x80 >> (index % 8);
    }
}

// ---------------------------------------------------------------------------
// Frame: validated, named fields
// ---------------------------------------------------------------------------

/// A validated sensor frame.  Values stay in the sensor's raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Relative humidity in tenths of %RH.
    pub relative_humidity: u16,
    /// Temperature in tenths of °C.
    pub temperature: i16,
    /// Auxiliary byte of the 48-bit variant.
    pub aux: Option<u8>,
    /// Trailing checksum byte as received.
    pub checksum: u8,
    pub format: FrameFormat,
}

impl Frame {
    /// Validate the checksum and split a complete image into fields.
    ///
    /// An incomplete image cannot carry a valid sum and is reported as
    /// [`OneWireError::ChecksumInvalid`].
    pub fn decode(raw: &RawFrame) -> Result<Self, OneWireError> {
        if !raw.is_complete() {
            return Err(OneWireError::ChecksumInvalid);
        }
        let bytes = raw.bytes();
        let (data, sum) = bytes.split_at(bytes.len() - 1);
        if checksum(data) != sum[0] {
            return Err(OneWireError::ChecksumInvalid);
        }

        let relative_humidity = u16::from_be_bytes([data[0], data[1]]);
        let temp_raw = u16::from_be_bytes([data[2], data[3]]);
        let magnitude = (temp_raw & TEMP_MAGNITUDE) as i16;
        let temperature = if temp_raw & TEMP_SIGN != 0 {
            -magnitude
        } else {
            magnitude
        };
        let aux = match raw.format() {
            FrameFormat::Bits40 => None,
            FrameFormat::Bits48 => Some(data[4]),
        };

        Ok(Self {
            relative_humidity,
            temperature,
            aux,
            checksum: sum[0],
            format: raw.format(),
        })
    }
}
