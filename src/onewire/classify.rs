//! Pulse-width bit classification.
//!
//! The sensor encodes each bit in the length of a high pulse: roughly
//! 26 µs for a zero and 70 µs for a one.  The cutoff between the two is
//! the only calibration constant that differs across hardware variants.

/// A decoded bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Zero,
    One,
}

impl Symbol {
    pub const fn as_bit(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

/// Maps a measured high-pulse duration to a [`Symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitClassifier {
    cutoff_ticks: u32,
}

impl BitClassifier {
    pub const fn new(cutoff_ticks: u32) -> Self {
        Self { cutoff_ticks }
    }

    /// `Zero` at or below the cutoff, `One` strictly above it.
    pub const fn classify(&self, duration_ticks: u32) -> Symbol {
        if duration_ticks <= self.cutoff_ticks {
            Symbol::Zero
        } else {
            Symbol::One
        }
    }

    pub const fn cutoff_ticks(&self) -> u32 {
        self.cutoff_ticks
    }
}
