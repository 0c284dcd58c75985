//! Port traits: the boundary between the acquisition core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ core (decoder / accumulator / service)
//! ```
//!
//! Driven adapters (bus pins, tick clocks, event sinks) implement these
//! traits.  The core consumes them via generics, so it never touches
//! registers directly and every path can be driven from a host test.

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Bus I/O port (single bidirectional data line)
// ───────────────────────────────────────────────────────────────

/// Electrical level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

/// Pin direction as seen from the MCU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Output,
    Input,
}

/// The three bus primitives the single-wire decoder needs.
pub trait BusPort {
    /// Switch the line between driving (`Output`) and sampling (`Input`).
    fn set_direction(&mut self, direction: Direction);

    /// Drive a level.  Only meaningful while the direction is `Output`.
    fn write_level(&mut self, level: Level);

    /// Sample the current line level.
    fn read_level(&mut self) -> Level;
}

// ───────────────────────────────────────────────────────────────
// Tick clock port
// ───────────────────────────────────────────────────────────────

/// Free-running tick counter used for busy-wait budgets.
///
/// `now()` is allowed to wrap; callers only ever look at
/// `now().wrapping_sub(start)`.
pub trait TickSource {
    /// Current counter value.
    fn now(&self) -> u32;

    /// Counter rate in Hz.
    fn tick_hz(&self) -> u32;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn now(&self) -> u32 {
        (**self).now()
    }

    fn tick_hz(&self) -> u32 {
        (**self).tick_hz()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (serial log, radio uplink, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
