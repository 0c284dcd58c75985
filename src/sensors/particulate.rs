//! Shinyei PPD42NS-style particulate sensor read-out.
//!
//! The sensor signals particle density as the fraction of time its output
//! is held low.  A free-running 16-bit timer captures every edge on each
//! output (P1, P2) and raises an overflow interrupt on every wrap:
//!
//! ```text
//!  capture ISR ──▶ on_capture / on_edge ──┐
//!                                          ├─▶ ParticulateSensor (critical section)
//!  overflow ISR ─▶ on_overflow ───────────┘            │
//!                                                       ▼
//!                        foreground: read_ratio / take_fresh / wait_for_window
//! ```
//!
//! All state lives behind a `critical_section::Mutex`, so a
//! `ParticulateSensor` can sit in a `static` and be touched from interrupt
//! handlers and the main loop alike.  Foreground reads hold the critical
//! section only for the snapshot copy.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;

use super::occupancy::{ChannelId, Edge, EdgeEvent, PulseOccupancyAccumulator};
use super::window::TimerOverflowWindow;
use crate::config::SensorConfig;
use crate::error::RatioError;
use crate::timing::CounterExtender;

/// Most captures a single interrupt activation can report.
pub const MAX_PENDING_CAPTURES: usize = 8;

/// A raw capture register value with its channel and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub channel: ChannelId,
    pub edge: Edge,
    /// Counter value latched by the capture unit (pre-extension).
    pub raw: u32,
}

/// Everything pending in one interrupt activation.
#[derive(Debug, Clone, Default)]
pub struct InterruptSources {
    pub captures: Vec<Capture, MAX_PENDING_CAPTURES>,
    pub overflow: bool,
}

struct Inner<const N: usize> {
    accumulator: PulseOccupancyAccumulator<N>,
    window: TimerOverflowWindow,
    extender: CounterExtender,
    fresh: bool,
}

impl<const N: usize> Inner<N> {
    fn on_capture(&mut self, capture: &Capture) {
        let timestamp = self.extender.extend(capture.raw);
        self.accumulator.on_edge(capture.channel, capture.edge, timestamp);
    }

    fn on_overflow(&mut self) -> Option<[f32; N]> {
        self.extender.on_overflow();
        if !self.window.on_overflow() {
            return None;
        }
        let ratios = self
            .accumulator
            .on_window_complete(self.window.window_length_ticks(), self.extender.base());
        self.fresh = true;
        Some(ratios)
    }

    fn snapshot(&self) -> Result<[f32; N], RatioError> {
        if self.window.completed() {
            Ok(self.accumulator.ratios())
        } else {
            Err(RatioError::WindowNotReady)
        }
    }
}

/// Interrupt-shared duty-cycle meter for `N` capture channels.
pub struct ParticulateSensor<const N: usize> {
    inner: Mutex<RefCell<Inner<N>>>,
    window_ready: Signal<CriticalSectionRawMutex, [f32; N]>,
}

impl<const N: usize> ParticulateSensor<N> {
    /// `const` so the sensor can be placed in a `static` shared with ISRs.
    pub const fn new(window_length_ticks: u64, overflow_modulus: u32) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                accumulator: PulseOccupancyAccumulator::new(),
                window: TimerOverflowWindow::new(window_length_ticks, overflow_modulus),
                extender: CounterExtender::new(overflow_modulus),
                fresh: false,
            })),
            window_ready: Signal::new(),
        }
    }

    pub fn from_config(config: &SensorConfig) -> Self {
        Self::new(config.window_length_ticks(), config.overflow_modulus)
    }

    // -----------------------------------------------------------------------
    // Foreground control
    // -----------------------------------------------------------------------

    /// Begin a fresh window at the current logical time.  Ratios read as
    /// `WindowNotReady` until it closes.
    pub fn start_measurement_window(&self) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let now = inner.extender.base();
            inner.accumulator.restart(now);
            inner.window.restart();
            inner.fresh = false;
        });
        self.window_ready.reset();
    }

    /// Ratio of `channel` from the most recently closed window.
    pub fn read_ratio(&self, channel: ChannelId) -> Result<f32, RatioError> {
        if channel.0 as usize >= N {
            return Err(RatioError::UnknownChannel);
        }
        self.read_ratios().map(|r| r[channel.0 as usize])
    }

    /// Ratios of every channel, taken in one critical section.
    pub fn read_ratios(&self) -> Result<[f32; N], RatioError> {
        critical_section::with(|cs| self.inner.borrow_ref(cs).snapshot())
    }

    /// Non-blocking check-and-clear: `Some` once per closed window.
    pub fn take_fresh(&self) -> Option<[f32; N]> {
        let taken = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if !inner.fresh {
                return None;
            }
            inner.fresh = false;
            inner.snapshot().ok()
        });
        if taken.is_some() {
            self.window_ready.reset();
        }
        taken
    }

    /// Resolve with the ratios of the latest closed window not yet
    /// consumed, waiting for the overflow handler if there is none.
    ///
    /// Shares one notification with [`take_fresh`](Self::take_fresh): a
    /// window consumed by either is not returned by the other.
    pub async fn wait_for_window(&self) -> [f32; N] {
        let ratios = self.window_ready.wait().await;
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).fresh = false);
        ratios
    }

    /// Logical tick count of the most recent counter wrap.
    pub fn now_ticks(&self) -> u64 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).extender.base())
    }

    /// Windows closed since construction.
    pub fn windows_completed(&self) -> u32 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).window.windows_completed())
    }

    // -----------------------------------------------------------------------
    // Interrupt intake
    // -----------------------------------------------------------------------

    /// Feed one edge with an already-unwrapped timestamp.
    pub fn on_edge(&self, event: EdgeEvent) {
        critical_section::with(|cs| {
            self.inner
                .borrow_ref_mut(cs)
                .accumulator
                .on_edge(event.channel, event.edge, event.timestamp);
        });
    }

    /// Feed one edge with a raw capture register value.
    pub fn on_capture(&self, channel: ChannelId, edge: Edge, raw: u32) {
        let capture = Capture { channel, edge, raw };
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).on_capture(&capture));
    }

    /// Counter wrapped.
    pub fn on_overflow(&self) {
        let closed = critical_section::with(|cs| self.inner.borrow_ref_mut(cs).on_overflow());
        if let Some(ratios) = closed {
            self.window_ready.signal(ratios);
        }
    }

    /// Handle one interrupt activation.  Captures are applied before the
    /// overflow so an edge latched in the same activation as a wrap is
    /// timestamped against the pre-wrap count.
    pub fn service_interrupt(&self, sources: &InterruptSources) {
        let closed = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            for capture in &sources.captures {
                inner.on_capture(capture);
            }
            if sources.overflow {
                inner.on_overflow()
            } else {
                None
            }
        });
        if let Some(ratios) = closed {
            self.window_ready.signal(ratios);
        }
    }
}
