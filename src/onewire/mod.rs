//! Single-wire request/response frame decoder.
//!
//! The host pulls the line low to request a reading, releases it, and the
//! sensor answers with an 80 µs low / 80 µs high acknowledge followed by
//! one low-then-high pulse pair per bit.  Only the high half carries data.
//!
//! ```text
//!  IDLE ──request──▶ SENDING_START ──▶ AWAIT_ACK_LOW ──low──▶ AWAIT_ACK_HIGH
//!    ▲                                      │ timeout             │ high
//!    │                                      ▼                     ▼
//!    │                               ERROR(StuckHigh)     RECEIVING_BIT(0..n)
//!    │                                                            │ last bit
//!    └──────────────reset────────── DONE / ERROR ◀────────────────┘
//! ```
//!
//! The decoder is driven synchronously on one foreground stack.  Every
//! phase is a single [`wait_until`] with a tick budget; timeout expiry is
//! the only way a phase ends early.  Terminal states are held until the
//! caller calls [`OneWireDecoder::reset`].

pub mod classify;
pub mod frame;

use log::{debug, warn};

use crate::app::ports::{BusPort, Direction, Level, TickSource};
use crate::config::{DecoderTiming, SensorConfig};
use crate::error::{Busy, OneWireError};
use crate::timing::{delay_ticks, wait_until};
use classify::BitClassifier;
use frame::{Frame, RawFrame};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    SendingStart,
    AwaitingAckLow,
    AwaitingAckHigh,
    /// Waiting for bit `n` (zero-based); `n` is the raw frame's
    /// received-bit count.
    ReceivingBit(u8),
    Done(Frame),
    Error(OneWireError),
}

impl DecoderState {
    /// `Done` or `Error`: a result is waiting for pickup.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Error(_))
    }

    /// A transaction is underway and owns the bus.
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, Self::Idle) && !self.is_terminal()
    }
}

/// Outcome of [`OneWireDecoder::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// No request outstanding.
    Pending,
    Ready(Frame),
    Failed(OneWireError),
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Owns one bus and the state of at most one read on it.
pub struct OneWireDecoder<B, C> {
    bus: B,
    clock: C,
    timing: DecoderTiming,
    classifier: BitClassifier,
    state: DecoderState,
    raw: RawFrame,
}

impl<B: BusPort, C: TickSource> OneWireDecoder<B, C> {
    pub fn new(bus: B, clock: C, timing: DecoderTiming) -> Self {
        Self {
            bus,
            clock,
            classifier: BitClassifier::new(timing.bit_cutoff_ticks),
            raw: RawFrame::new(timing.frame_format),
            timing,
            state: DecoderState::Idle,
        }
    }

    /// Build a decoder whose budgets are converted at the clock's rate.
    pub fn from_config(bus: B, clock: C, config: &SensorConfig) -> Self {
        let timing = config.decoder_timing(clock.tick_hz());
        Self::new(bus, clock, timing)
    }

    /// Accept a new read.  Anything other than `Idle` (including an
    /// unclaimed `Done` or `Error`) is refused without side effects.
    pub fn request(&mut self) -> Result<(), Busy> {
        if self.state != DecoderState::Idle {
            debug!("one-wire: request refused in {:?}", self.state);
            return Err(Busy);
        }
        self.raw = RawFrame::new(self.timing.frame_format);
        self.state = DecoderState::SendingStart;
        Ok(())
    }

    /// Return to `Idle` from any state and release the line.
    pub fn reset(&mut self) {
        if self.state != DecoderState::Idle {
            self.bus.set_direction(Direction::Input);
            self.state = DecoderState::Idle;
        }
    }

    /// Run an in-flight read to completion and report the result.
    pub fn poll(&mut self) -> ReadStatus {
        loop {
            match self.state {
                DecoderState::Idle => return ReadStatus::Pending,
                DecoderState::Done(frame) => return ReadStatus::Ready(frame),
                DecoderState::Error(e) => return ReadStatus::Failed(e),
                _ => {
                    self.step();
                }
            }
        }
    }

    /// Execute exactly one phase and return the state it led to.
    pub fn step(&mut self) -> DecoderState {
        let next = match self.state {
            DecoderState::Idle | DecoderState::Done(_) | DecoderState::Error(_) => self.state,
            DecoderState::SendingStart => self.send_start(),
            DecoderState::AwaitingAckLow => self.await_ack_low(),
            DecoderState::AwaitingAckHigh => self.await_ack_high(),
            DecoderState::ReceivingBit(_) => self.receive_bit(),
        };

        match next {
            DecoderState::Error(e) => warn!("one-wire: {:?} failed: {e}", self.state),
            DecoderState::Done(f) => debug!(
                "one-wire: frame RH={} T={} sum=0x{:02x}",
                f.relative_humidity, f.temperature, f.checksum
            ),
            DecoderState::ReceivingBit(i) if i > 0 => {}
            s if s != self.state => debug!("one-wire: {:?} -> {:?}", self.state, s),
            _ => {}
        }
        self.state = next;
        next
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn timing(&self) -> &DecoderTiming {
        &self.timing
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give back the bus and clock.
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    fn send_start(&mut self) -> DecoderState {
        self.bus.write_level(Level::Low);
        self.bus.set_direction(Direction::Output);
        delay_ticks(&self.clock, self.timing.start_signal_ticks);
        DecoderState::AwaitingAckLow
    }

    fn await_ack_low(&mut self) -> DecoderState {
        self.bus.set_direction(Direction::Input);
        match self.wait_for(Level::Low, self.timing.response_timeout_ticks) {
            Ok(_) => DecoderState::AwaitingAckHigh,
            Err(e) => DecoderState::Error(e),
        }
    }

    fn await_ack_high(&mut self) -> DecoderState {
        match self.wait_for(Level::High, self.timing.response_timeout_ticks) {
            Ok(_) => DecoderState::ReceivingBit(0),
            Err(e) => DecoderState::Error(e),
        }
    }

    fn receive_bit(&mut self) -> DecoderState {
        let budget = self.timing.bit_timeout_ticks;
        let measured = self
            .wait_for(Level::Low, budget)
            .and_then(|_| self.wait_for(Level::High, budget))
            .and_then(|_| self.wait_for(Level::Low, budget));
        let high_ticks = match measured {
            Ok(ticks) => ticks,
            Err(e) => return DecoderState::Error(e),
        };

        let symbol = self.classifier.classify(high_ticks);
        if !self.raw.push_bit(symbol) {
            return DecoderState::ReceivingBit(self.raw.bits_received());
        }

        match Frame::decode(&self.raw) {
            Ok(frame) => DecoderState::Done(frame),
            Err(e) => DecoderState::Error(e),
        }
    }

    /// Wait for the line to reach `level`.  A timeout is reported as the
    /// line being stuck at the opposite level.
    fn wait_for(&mut self, level: Level, budget: u32) -> Result<u32, OneWireError> {
        let bus = &mut self.bus;
        wait_until(&self.clock, budget, || bus.read_level() == level).map_err(|_| match level {
            Level::Low => OneWireError::StuckHigh,
            Level::High => OneWireError::StuckLow,
        })
    }
}
