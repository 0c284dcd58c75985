//! Tick arithmetic shared by both acquisition regimes.
//!
//! - [`wait_until`] is the one bounded busy-wait every decoder phase uses.
//! - [`CounterExtender`] turns a 16-bit capture value into a logical
//!   timestamp that keeps growing across counter wraps.

use crate::app::ports::TickSource;

/// A bounded wait ran out of budget before its condition held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    /// Ticks observed when the wait gave up.
    pub elapsed: u32,
}

/// Convert a microsecond constant to ticks at `tick_hz`, rounding up so a
/// non-zero duration never collapses to a zero budget.
pub const fn us_to_ticks(us: u32, tick_hz: u32) -> u32 {
    let ticks = (us as u64 * tick_hz as u64).div_ceil(1_000_000);
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Spin until `condition` returns `true` or more than `budget` ticks pass.
///
/// On success returns the ticks elapsed at the sample that satisfied the
/// condition, which is how pulse widths are measured.
pub fn wait_until<C, F>(clock: &C, budget: u32, mut condition: F) -> Result<u32, Timeout>
where
    C: TickSource + ?Sized,
    F: FnMut() -> bool,
{
    let start = clock.now();
    loop {
        let elapsed = clock.now().wrapping_sub(start);
        if condition() {
            return Ok(elapsed);
        }
        if elapsed > budget {
            return Err(Timeout { elapsed });
        }
    }
}

/// Spin for `ticks` ticks.
pub fn delay_ticks<C: TickSource + ?Sized>(clock: &C, ticks: u32) {
    // Always runs to the budget.
    let _ = wait_until(clock, ticks, || false);
}

// ---------------------------------------------------------------------------
// Counter extension
// ---------------------------------------------------------------------------

/// Extends a free-running hardware counter with a software overflow count.
///
/// A capture value `raw` taken after `n` overflows maps to
/// `n * modulus + raw`.  The base is 64-bit, so at 1 MHz with a 16-bit
/// counter it does not wrap for the lifetime of any deployment.
#[derive(Debug, Clone, Copy)]
pub struct CounterExtender {
    modulus: u32,
    base: u64,
}

impl CounterExtender {
    pub const fn new(modulus: u32) -> Self {
        Self { modulus, base: 0 }
    }

    /// Account for one counter wrap.
    pub fn on_overflow(&mut self) {
        self.base += self.modulus as u64;
    }

    /// Logical timestamp of a raw capture value taken since the last wrap.
    pub fn extend(&self, raw: u32) -> u64 {
        self.base + raw as u64
    }

    /// Logical timestamp of the most recent wrap.
    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn modulus(&self) -> u32 {
        self.modulus
    }
}
