//! Platform tick source for the single-wire decoder.
//!
//! - **`feature = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(feature = "espidf")`**: uses `std::time::Instant` for
//!   host-side runs.
//!
//! Both tick at 1 MHz and truncate to `u32`; the decoder only ever
//! subtracts two samples, so the wrap every ~71 minutes is harmless.

use crate::app::ports::TickSource;

/// Microsecond tick rate of [`MonotonicTicks`].
pub const MONOTONIC_TICK_HZ: u32 = 1_000_000;

/// Free-running microsecond counter.
pub struct MonotonicTicks {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicTicks {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic, 64-bit).
    #[cfg(feature = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic, 64-bit).
    #[cfg(not(feature = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot, for read pacing.
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

impl TickSource for MonotonicTicks {
    fn now(&self) -> u32 {
        self.uptime_us() as u32
    }

    fn tick_hz(&self) -> u32 {
        MONOTONIC_TICK_HZ
    }
}
