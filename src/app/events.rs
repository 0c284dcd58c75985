//! Outbound application events.
//!
//! The [`AcquisitionService`](super::service::AcquisitionService) emits
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them: log to serial, forward
//! over a radio link, or record them in a test.

use crate::error::OneWireError;
use crate::onewire::frame::Frame;
use crate::sensors::ChannelId;

/// Structured events emitted by the acquisition core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A measurement window was (re)started.
    WindowStarted,

    /// A window closed; one event per channel.
    ParticulateRatio { channel: ChannelId, ratio: f32 },

    /// A single-wire frame decoded and passed its checksum.
    Climate(Frame),

    /// A single-wire read failed.
    ClimateFault {
        error: OneWireError,
        consecutive: u32,
    },
}
