//! embedded-hal adapter for the single-wire data line.
//!
//! The line is open-drain with an external pull-up.  "Input" therefore
//! means releasing the line (driving the open-drain output high) and
//! sampling it; "Output" means actively driving the last written level.
//!
//! A pin read that fails is logged and reported as `High`, the released
//! idle level, so a persistent pin fault surfaces as a bus-stuck timeout
//! in the decoder rather than a separate error class.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{BusPort, Direction, Level};

/// [`BusPort`] over any open-drain input/output pin.
pub struct HalBus<P> {
    pin: P,
    direction: Direction,
    level: Level,
}

impl<P: InputPin + OutputPin> HalBus<P> {
    /// Take the pin and release the line.
    pub fn new(mut pin: P) -> Self {
        if pin.set_high().is_err() {
            warn!("one-wire bus: failed to release line at init");
        }
        Self {
            pin,
            direction: Direction::Input,
            level: Level::High,
        }
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, level: Level) {
        let result = match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        };
        if let Err(e) = result {
            warn!("one-wire bus: drive {:?} failed: {:?}", level, e);
        }
    }
}

impl<P: InputPin + OutputPin> BusPort for HalBus<P> {
    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        match direction {
            Direction::Output => self.drive(self.level),
            Direction::Input => self.drive(Level::High),
        }
    }

    fn write_level(&mut self, level: Level) {
        self.level = level;
        if self.direction == Direction::Output {
            self.drive(level);
        }
    }

    fn read_level(&mut self) -> Level {
        match self.pin.is_low() {
            Ok(true) => Level::Low,
            Ok(false) => Level::High,
            Err(e) => {
                warn!("one-wire bus: read failed: {:?}", e);
                Level::High
            }
        }
    }
}
