//! Acquisition configuration parameters
//!
//! All tunable timing for the particulate window and the single-wire
//! decoder.  Values can be overridden from a JSON blob at boot.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::onewire::frame::FrameFormat;
use crate::timing::us_to_ticks;

/// Core acquisition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    // --- Particulate (input capture) ---
    /// Input-capture timer rate in Hz (32 MHz / 32 on the reference board)
    pub capture_timer_hz: u32,
    /// Ticks per counter wrap (16-bit free-running counter)
    pub overflow_modulus: u32,
    /// Measurement window length (seconds)
    pub window_secs: u32,

    // --- Single-wire bus ---
    /// Host start pulse held low (microseconds)
    pub start_signal_us: u32,
    /// Budget for each handshake phase (microseconds)
    pub response_timeout_us: u32,
    /// Budget for each per-bit edge phase (microseconds)
    pub bit_timeout_us: u32,
    /// High-time cutoff: at or below is a zero bit (microseconds)
    pub bit_cutoff_us: u32,
    /// Frame length variant
    pub frame_format: FrameFormat,
    /// Minimum spacing between two reads (milliseconds)
    pub min_read_interval_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            // Particulate
            capture_timer_hz: 1_000_000,
            overflow_modulus: 0x1_0000,
            window_secs: 30,

            // Single-wire
            start_signal_us: 20_000, // 20 ms
            response_timeout_us: 200,
            bit_timeout_us: 100,
            bit_cutoff_us: 50, // zero ≈ 26 µs, one ≈ 70 µs
            frame_format: FrameFormat::Bits40,
            min_read_interval_ms: 2_000,
        }
    }
}

/// Tick budgets for one decoder, derived from a [`SensorConfig`] and the
/// decoder clock's rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderTiming {
    pub start_signal_ticks: u32,
    pub response_timeout_ticks: u32,
    pub bit_timeout_ticks: u32,
    pub bit_cutoff_ticks: u32,
    pub frame_format: FrameFormat,
}

impl SensorConfig {
    /// Parse a JSON override.  Missing fields keep their defaults.
    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        let cfg: Self =
            serde_json::from_slice(bytes).context("sensor config: malformed JSON")?;
        cfg.validate()
            .map_err(|e| anyhow::anyhow!("sensor config rejected: {e}"))?;
        Ok(cfg)
    }

    /// Window length in capture-timer ticks.
    pub fn window_length_ticks(&self) -> u64 {
        self.window_secs as u64 * self.capture_timer_hz as u64
    }

    /// Convert the microsecond constants to ticks at `tick_hz`.
    pub fn decoder_timing(&self, tick_hz: u32) -> DecoderTiming {
        DecoderTiming {
            start_signal_ticks: us_to_ticks(self.start_signal_us, tick_hz),
            response_timeout_ticks: us_to_ticks(self.response_timeout_us, tick_hz),
            bit_timeout_ticks: us_to_ticks(self.bit_timeout_us, tick_hz),
            bit_cutoff_ticks: us_to_ticks(self.bit_cutoff_us, tick_hz),
            frame_format: self.frame_format,
        }
    }

    /// Reject parameter combinations the acquisition code cannot honour.
    pub fn validate(&self) -> Result<(), Error> {
        if self.capture_timer_hz == 0 {
            return Err(Error::Config("capture timer rate is zero"));
        }
        if self.overflow_modulus == 0 {
            return Err(Error::Config("overflow modulus is zero"));
        }
        if self.window_length_ticks() < self.overflow_modulus as u64 {
            return Err(Error::Config("window shorter than one overflow period"));
        }
        if self.bit_cutoff_us == 0 || self.bit_cutoff_us >= self.bit_timeout_us {
            return Err(Error::Config("bit cutoff must lie inside the bit timeout"));
        }
        if self.response_timeout_us == 0 {
            return Err(Error::Config("response timeout is zero"));
        }
        Ok(())
    }
}
