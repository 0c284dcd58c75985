//! Measurement window driven by counter overflows.
//!
//! Each overflow adds one counter period to the elapsed count.  The first
//! overflow that pushes the count past the window length closes the
//! window, and the count restarts from zero rather than from the
//! remainder.  Window length therefore jitters by up to one overflow
//! period, which the occupancy ratio tolerates.

#[derive(Debug, Clone, Copy)]
pub struct TimerOverflowWindow {
    elapsed_ticks: u64,
    window_length_ticks: u64,
    overflow_modulus: u32,
    completed: bool,
    windows: u32,
}

impl TimerOverflowWindow {
    pub const fn new(window_length_ticks: u64, overflow_modulus: u32) -> Self {
        Self {
            elapsed_ticks: 0,
            window_length_ticks,
            overflow_modulus,
            completed: false,
            windows: 0,
        }
    }

    /// Account for one counter wrap.  Returns `true` exactly when this
    /// overflow closes a window.
    pub fn on_overflow(&mut self) -> bool {
        self.elapsed_ticks += self.overflow_modulus as u64;
        if self.elapsed_ticks > self.window_length_ticks {
            self.elapsed_ticks = 0;
            self.completed = true;
            self.windows = self.windows.wrapping_add(1);
            true
        } else {
            false
        }
    }

    /// Discard progress and forget previous completions.
    pub fn restart(&mut self) {
        self.elapsed_ticks = 0;
        self.completed = false;
    }

    /// At least one window has closed since the last restart.
    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn window_length_ticks(&self) -> u64 {
        self.window_length_ticks
    }

    /// Windows closed since construction.
    pub fn windows_completed(&self) -> u32 {
        self.windows
    }
}
