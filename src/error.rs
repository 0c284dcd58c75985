//! Unified error types for the acquisition core.
//!
//! Every failure is returned as a value.  All variants are `Copy` so they
//! can be stored inside the decoder state and handed across the
//! interrupt/foreground boundary without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A single-wire transaction failed.
    OneWire(OneWireError),
    /// A single-wire request was rejected because one is already in flight.
    Busy(Busy),
    /// A duty-cycle ratio could not be read.
    Ratio(RatioError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneWire(e) => write!(f, "one-wire: {e}"),
            Self::Busy(e) => write!(f, "one-wire: {e}"),
            Self::Ratio(e) => write!(f, "particulate: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Single-wire protocol errors
// ---------------------------------------------------------------------------

/// Terminal failure of a single-wire read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneWireError {
    /// The bus stayed high while a falling edge was expected.
    StuckHigh,
    /// The bus stayed low while a rising edge was expected.
    StuckLow,
    /// All bits arrived but the trailing sum byte did not match.
    ChecksumInvalid,
}

impl fmt::Display for OneWireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StuckHigh => write!(f, "bus stuck high"),
            Self::StuckLow => write!(f, "bus stuck low"),
            Self::ChecksumInvalid => write!(f, "checksum invalid"),
        }
    }
}

impl From<OneWireError> for Error {
    fn from(e: OneWireError) -> Self {
        Self::OneWire(e)
    }
}

/// A read was requested while the decoder was not `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy;

impl fmt::Display for Busy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transaction in progress")
    }
}

impl From<Busy> for Error {
    fn from(e: Busy) -> Self {
        Self::Busy(e)
    }
}

// ---------------------------------------------------------------------------
// Particulate read-out errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioError {
    /// No measurement window has completed since the last start.
    WindowNotReady,
    /// The channel index is outside the configured channel count.
    UnknownChannel,
}

impl fmt::Display for RatioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowNotReady => write!(f, "window not ready"),
            Self::UnknownChannel => write!(f, "unknown channel"),
        }
    }
}

impl From<RatioError> for Error {
    fn from(e: RatioError) -> Self {
        Self::Ratio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
