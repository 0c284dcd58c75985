//! Particulate sensor subsystem: occupancy accumulation, the overflow
//! window, and the interrupt-shared [`ParticulateSensor`] that ties them
//! together.

pub mod occupancy;
pub mod particulate;
pub mod window;

pub use occupancy::{Channel, ChannelId, Edge, EdgeEvent, PulseOccupancyAccumulator};
pub use particulate::{Capture, InterruptSources, ParticulateSensor};
pub use window::TimerOverflowWindow;

/// Capture channels wired on the reference board: one sensor, P1 and P2.
pub const DEFAULT_CHANNELS: usize = 2;
