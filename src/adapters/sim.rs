//! Host-side simulation of the single-wire sensor and its tick clock.
//!
//! [`SimClock`] advances one tick every time it is sampled, so a busy-wait
//! loop makes deterministic progress without real time passing.
//! [`SimSensorBus`] replays the waveform a sensor would drive after the
//! host releases the line, optionally with an injected fault.

use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use crate::app::ports::{BusPort, Direction, Level, TickSource};
use crate::onewire::classify::Symbol;
use crate::onewire::frame::RawFrame;
use crate::timing::us_to_ticks;

// Nominal sensor timings (µs).
const RESPONSE_DELAY_US: u32 = 30;
const ACK_LOW_US: u32 = 80;
const ACK_HIGH_US: u32 = 80;
const BIT_LOW_US: u32 = 50;
const ZERO_HIGH_US: u32 = 26;
const ONE_HIGH_US: u32 = 70;
/// The sensor ignores start pulses shorter than this.
const MIN_START_US: u32 = 1_000;

/// Shared simulated tick counter.
#[derive(Debug, Clone)]
pub struct SimClock {
    now: Rc<Cell<u64>>,
    hz: u32,
}

impl SimClock {
    pub fn new(hz: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            hz,
        }
    }

    /// Current tick without advancing.
    pub fn peek(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, ticks: u64) {
        self.now.set(self.now.get() + ticks);
    }
}

impl TickSource for SimClock {
    fn now(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t + 1);
        t as u32
    }

    fn tick_hz(&self) -> u32 {
        self.hz
    }
}

/// Fault injected into the simulated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The sensor never pulls the line low.
    NoResponse,
    /// The acknowledge low never ends.
    StuckLowAfterAck,
    /// The line floats high after `n` complete bits.
    StuckHighAfterBits(u8),
    /// The low half of bit `n` never ends.
    StuckLowAtBit(u8),
}

/// Simulated open-drain line with a sensor attached.
#[derive(Debug)]
pub struct SimSensorBus {
    clock: SimClock,
    frame: RawFrame,
    fault: Option<Fault>,
    direction: Direction,
    driven: Level,
    low_since: Option<u64>,
    /// Waveform of the current response: segments and the level after them.
    response: Option<(u64, Vec<(Level, u64)>, Level)>,
    transactions: u32,
}

impl SimSensorBus {
    pub fn new(clock: &SimClock, frame: RawFrame, fault: Option<Fault>) -> Self {
        Self {
            clock: clock.clone(),
            frame,
            fault,
            direction: Direction::Input,
            driven: Level::High,
            low_since: None,
            response: None,
            transactions: 0,
        }
    }

    pub fn set_fault(&mut self, fault: Option<Fault>) {
        self.fault = fault;
    }

    pub fn set_frame(&mut self, frame: RawFrame) {
        self.frame = frame;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of start pulses the sensor has answered (or tried to).
    pub fn transactions(&self) -> u32 {
        self.transactions
    }

    fn ticks(&self, us: u32) -> u64 {
        us_to_ticks(us, self.clock.tick_hz()) as u64
    }

    fn build_response(&self, answered: bool) -> (Vec<(Level, u64)>, Level) {
        let mut segments = Vec::new();
        segments.push((Level::High, self.ticks(RESPONSE_DELAY_US)));
        if !answered || self.fault == Some(Fault::NoResponse) {
            return (segments, Level::High);
        }
        segments.push((Level::Low, self.ticks(ACK_LOW_US)));
        if self.fault == Some(Fault::StuckLowAfterAck) {
            return (segments, Level::Low);
        }
        segments.push((Level::High, self.ticks(ACK_HIGH_US)));

        for index in 0..self.frame.format().bit_count() {
            if self.fault == Some(Fault::StuckHighAfterBits(index)) {
                return (segments, Level::High);
            }
            segments.push((Level::Low, self.ticks(BIT_LOW_US)));
            if self.fault == Some(Fault::StuckLowAtBit(index)) {
                return (segments, Level::Low);
            }
            let high = match self.frame.bit(index as usize) {
                Symbol::Zero => ZERO_HIGH_US,
                Symbol::One => ONE_HIGH_US,
            };
            segments.push((Level::High, self.ticks(high)));
        }
        segments.push((Level::Low, self.ticks(BIT_LOW_US)));
        (segments, Level::High)
    }
}

impl BusPort for SimSensorBus {
    fn set_direction(&mut self, direction: Direction) {
        let now = self.clock.peek();
        match (self.direction, direction) {
            (Direction::Input, Direction::Output) => {
                self.response = None;
                if self.driven == Level::Low {
                    self.low_since = Some(now);
                }
            }
            (Direction::Output, Direction::Input) => {
                let held = self.low_since.take().map_or(0, |since| now - since);
                if held > 0 {
                    let answered = held >= self.ticks(MIN_START_US);
                    let (segments, tail) = self.build_response(answered);
                    self.response = Some((now, segments, tail));
                    self.transactions += 1;
                }
            }
            _ => {}
        }
        self.direction = direction;
    }

    fn write_level(&mut self, level: Level) {
        if self.direction == Direction::Output {
            match (self.driven, level) {
                (Level::High, Level::Low) => self.low_since = Some(self.clock.peek()),
                (Level::Low, Level::High) => self.low_since = None,
                _ => {}
            }
        }
        self.driven = level;
    }

    fn read_level(&mut self) -> Level {
        if self.direction == Direction::Output {
            return self.driven;
        }
        let Some((released_at, segments, tail)) = &self.response else {
            return Level::High;
        };
        let mut offset = self.clock.peek() - released_at;
        for (level, len) in segments {
            if offset < *len {
                return *level;
            }
            offset -= len;
        }
        *tail
    }
}
