//! Low-pulse occupancy accumulation for one or more capture channels.
//!
//! A channel adds up how long its line spent low during the current
//! window.  Timestamps are logical ticks already extended across counter
//! wraps, so a plain subtraction gives the pulse width.
//!
//! ## Window boundaries
//!
//! `last_low_edge_ticks` is never cleared at a boundary.  A pulse that is
//! still low when a window closes is split: the part up to the boundary is
//! credited to the closing window, and the edge marker moves to the
//! boundary so the remainder lands in the next one.  The boundary itself
//! is the overflow that closed the window, which can trail the nominal
//! window end by one overflow period; the resulting error is bounded by
//! one pulse width per window and is accepted for this sensor.

use crate::error::RatioError;

/// Direction of a captured transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// low → high: a low pulse ended.
    Rising,
    /// high → low: a low pulse began.
    Falling,
}

/// Index of a capture channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u8);

impl ChannelId {
    /// First sensor, P1 output (particles ≥ 1 µm).
    pub const P1: Self = Self(0);
    /// First sensor, P2 output (particles ≥ 2.5 µm).
    pub const P2: Self = Self(1);
}

/// One captured transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub channel: ChannelId,
    pub edge: Edge,
    /// Unwrapped logical tick count.
    pub timestamp: u64,
}

/// Accumulation state of a single line.
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    accumulated_low_ticks: u64,
    last_low_edge_ticks: u64,
    low: bool,
    ratio: f32,
}

impl Channel {
    pub const fn new() -> Self {
        Self {
            accumulated_low_ticks: 0,
            last_low_edge_ticks: 0,
            low: false,
            ratio: 0.0,
        }
    }

    pub fn on_edge(&mut self, edge: Edge, timestamp: u64) {
        match edge {
            Edge::Rising => {
                self.accumulated_low_ticks = self
                    .accumulated_low_ticks
                    .saturating_add(timestamp.saturating_sub(self.last_low_edge_ticks));
                self.low = false;
            }
            Edge::Falling => {
                self.last_low_edge_ticks = timestamp;
                self.low = true;
            }
        }
    }

    /// Close the window at `boundary` and compute its ratio.
    pub fn on_window_complete(&mut self, window_length_ticks: u64, boundary: u64) -> f32 {
        if self.low && boundary > self.last_low_edge_ticks {
            self.accumulated_low_ticks = self
                .accumulated_low_ticks
                .saturating_add(boundary - self.last_low_edge_ticks);
            self.last_low_edge_ticks = boundary;
        }
        self.ratio = if window_length_ticks == 0 {
            0.0
        } else {
            // Lost edges can push the sum past the window.
            (self.accumulated_low_ticks as f32 / window_length_ticks as f32).clamp(0.0, 1.0)
        };
        self.accumulated_low_ticks = 0;
        self.ratio
    }

    /// Forget accumulated time and treat `now` as the start of a fresh
    /// window.  The line level is physical state and carries over.
    pub fn restart(&mut self, now: u64) {
        *self = Self {
            last_low_edge_ticks: now,
            low: self.low,
            ..Self::new()
        };
    }

    /// Ratio of the last completed window.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn accumulated_low_ticks(&self) -> u64 {
        self.accumulated_low_ticks
    }

    pub fn last_low_edge_ticks(&self) -> u64 {
        self.last_low_edge_ticks
    }

    pub fn is_low(&self) -> bool {
        self.low
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed set of `N` channels sharing one measurement window.
#[derive(Debug, Clone)]
pub struct PulseOccupancyAccumulator<const N: usize> {
    channels: [Channel; N],
}

impl<const N: usize> PulseOccupancyAccumulator<N> {
    pub const fn new() -> Self {
        Self {
            channels: [Channel::new(); N],
        }
    }

    /// Feed one transition.  Events for unknown channels are dropped and
    /// reported as `false`.
    pub fn on_edge(&mut self, channel: ChannelId, edge: Edge, timestamp: u64) -> bool {
        match self.channels.get_mut(channel.0 as usize) {
            Some(ch) => {
                ch.on_edge(edge, timestamp);
                true
            }
            None => false,
        }
    }

    /// Close the window on every channel; returns the new ratios.
    pub fn on_window_complete(&mut self, window_length_ticks: u64, boundary: u64) -> [f32; N] {
        let mut ratios = [0.0; N];
        for (ratio, ch) in ratios.iter_mut().zip(self.channels.iter_mut()) {
            *ratio = ch.on_window_complete(window_length_ticks, boundary);
        }
        ratios
    }

    pub fn restart(&mut self, now: u64) {
        for ch in &mut self.channels {
            ch.restart(now);
        }
    }

    pub fn channel(&self, channel: ChannelId) -> Result<&Channel, RatioError> {
        self.channels
            .get(channel.0 as usize)
            .ok_or(RatioError::UnknownChannel)
    }

    pub fn ratios(&self) -> [f32; N] {
        let mut out = [0.0; N];
        for (o, ch) in out.iter_mut().zip(self.channels.iter()) {
            *o = ch.ratio();
        }
        out
    }
}

impl<const N: usize> Default for PulseOccupancyAccumulator<N> {
    fn default() -> Self {
        Self::new()
    }
}
