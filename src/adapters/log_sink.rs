//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured acquisition events to
//! the logger (UART / USB-CDC on the device, whatever the harness installs
//! on the host).  An uplink adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Install the platform logger.  No-op on the host, where test harnesses
/// install their own.
#[cfg(feature = "espidf")]
pub fn init_logging() -> anyhow::Result<()> {
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(feature = "espidf"))]
pub fn init_logging() -> anyhow::Result<()> {
    Ok(())
}

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::WindowStarted => {
                info!("PM | window started");
            }
            AppEvent::ParticulateRatio { channel, ratio } => {
                info!("PM | ch{} low ratio={:.4}", channel.0, ratio);
            }
            AppEvent::Climate(f) => {
                info!(
                    "CLIMATE | RH={}.{}% | T={:.1}\u{00b0}C | sum=0x{:02x}",
                    f.relative_humidity / 10,
                    f.relative_humidity % 10,
                    f.temperature as f32 / 10.0,
                    f.checksum,
                );
            }
            AppEvent::ClimateFault { error, consecutive } => {
                warn!("CLIMATE | read failed: {} ({} in a row)", error, consecutive);
            }
        }
    }
}
