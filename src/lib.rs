//! envsense: interrupt-driven environmental sensor acquisition.
//!
//! Two regimes share this crate:
//!
//! - **Particulate** ([`sensors`]): an optical dust sensor's low-pulse
//!   occupancy is accumulated from capture-timer edge interrupts and
//!   closed into a ratio every fixed-length window.
//! - **Climate** ([`onewire`]): a humidity/temperature sensor is read over
//!   a single-wire request/response protocol, decoded bit by bit from
//!   pulse widths and checked against a trailing byte sum.
//!
//! Hardware is reached only through the port traits in [`app::ports`].
//! ESP-IDF-specific code is guarded by the `espidf` feature inside
//! [`adapters`]; everything else builds and tests on the host.

#![deny(unused_must_use)]

// Links the ESP-IDF critical-section implementation.
#[cfg(feature = "espidf")]
use esp_idf_hal as _;

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod onewire;
pub mod sensors;
pub mod timing;

pub use error::{Busy, Error, OneWireError, RatioError, Result};
