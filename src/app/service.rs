//! Application service: the foreground side of both acquisition regimes.
//!
//! [`AcquisitionService`] owns no hardware.  The particulate sensor and the
//! single-wire decoder are passed in at each call, so the service can be
//! exercised from host tests with simulated adapters.
//!
//! ```text
//!  ParticulateSensor ──▶ ┌─────────────────────┐ ──▶ EventSink
//!                        │ AcquisitionService  │
//!  OneWireDecoder ◀────▶ │ pacing · stats      │
//!                        └─────────────────────┘
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::SensorConfig;
use crate::error::OneWireError;
use crate::onewire::frame::Frame;
use crate::onewire::{OneWireDecoder, ReadStatus};
use crate::sensors::{ChannelId, ParticulateSensor};

use super::events::AppEvent;
use super::ports::{BusPort, EventSink, TickSource};

/// Result of one [`AcquisitionService::read_climate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateOutcome {
    Reading(Frame),
    Failed(OneWireError),
    /// The previous read was less than the minimum interval ago.
    TooSoon,
    /// The decoder still holds an unclaimed result.
    Busy,
}

/// Running single-wire read counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStats {
    pub ok: u32,
    pub stuck_high: u32,
    pub stuck_low: u32,
    pub checksum_invalid: u32,
    /// Failures since the last good frame.
    pub consecutive_failures: u32,
}

impl ReadStats {
    fn record(&mut self, error: OneWireError) {
        match error {
            OneWireError::StuckHigh => self.stuck_high += 1,
            OneWireError::StuckLow => self.stuck_low += 1,
            OneWireError::ChecksumInvalid => self.checksum_invalid += 1,
        }
        self.consecutive_failures += 1;
    }

    pub fn failures(&self) -> u32 {
        self.stuck_high + self.stuck_low + self.checksum_invalid
    }
}

/// Foreground orchestration of particulate read-out and climate reads.
pub struct AcquisitionService {
    min_read_interval_ms: u32,
    last_read_ms: Option<u64>,
    stats: ReadStats,
}

impl AcquisitionService {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            min_read_interval_ms: config.min_read_interval_ms,
            last_read_ms: None,
            stats: ReadStats::default(),
        }
    }

    /// Open the first particulate window.
    pub fn start<const N: usize>(&mut self, sensor: &ParticulateSensor<N>, sink: &mut impl EventSink) {
        sensor.start_measurement_window();
        info!("acquisition: window started on {} channel(s)", N);
        sink.emit(&AppEvent::WindowStarted);
    }

    /// Emit the ratios of a freshly closed window, if there is one.
    pub fn poll_particulates<const N: usize>(
        &mut self,
        sensor: &ParticulateSensor<N>,
        sink: &mut impl EventSink,
    ) -> Option<[f32; N]> {
        let ratios = sensor.take_fresh()?;
        for (index, ratio) in ratios.iter().enumerate() {
            sink.emit(&AppEvent::ParticulateRatio {
                channel: ChannelId(index as u8),
                ratio: *ratio,
            });
        }
        Some(ratios)
    }

    /// Run one complete single-wire read, paced to the sensor's minimum
    /// interval.  The decoder is always left `Idle` afterwards unless it
    /// was already holding someone else's result.
    pub fn read_climate<B: BusPort, C: TickSource>(
        &mut self,
        decoder: &mut OneWireDecoder<B, C>,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> ClimateOutcome {
        if let Some(last) = self.last_read_ms {
            let since = now_ms.saturating_sub(last);
            if since < self.min_read_interval_ms as u64 {
                debug!("acquisition: read skipped, {} ms since last", since);
                return ClimateOutcome::TooSoon;
            }
        }
        if decoder.request().is_err() {
            warn!("acquisition: decoder busy in {:?}", decoder.state());
            return ClimateOutcome::Busy;
        }
        self.last_read_ms = Some(now_ms);

        let status = decoder.poll();
        decoder.reset();

        match status {
            ReadStatus::Ready(frame) => {
                self.stats.ok += 1;
                self.stats.consecutive_failures = 0;
                sink.emit(&AppEvent::Climate(frame));
                ClimateOutcome::Reading(frame)
            }
            ReadStatus::Failed(error) => {
                self.stats.record(error);
                sink.emit(&AppEvent::ClimateFault {
                    error,
                    consecutive: self.stats.consecutive_failures,
                });
                ClimateOutcome::Failed(error)
            }
            ReadStatus::Pending => {
                // An accepted request always reaches a terminal state.
                warn!("acquisition: decoder returned to Idle mid-read");
                ClimateOutcome::Busy
            }
        }
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sim::{Fault, SimClock, SimSensorBus};
    use crate::onewire::frame::{FrameFormat, RawFrame};

    #[derive(Default)]
    struct Recorder(Vec<AppEvent>);

    impl EventSink for Recorder {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn decoder(fault: Option<Fault>) -> OneWireDecoder<SimSensorBus, SimClock> {
        let clock = SimClock::new(1_000_000);
        let bus = SimSensorBus::new(&clock, RawFrame::encode(FrameFormat::Bits40, 455, -52, 0), fault);
        OneWireDecoder::from_config(bus, clock, &SensorConfig::default())
    }

    #[test]
    fn reads_are_paced() {
        let mut svc = AcquisitionService::new(&SensorConfig::default());
        let mut d = decoder(None);
        let mut sink = Recorder::default();
        assert!(matches!(svc.read_climate(&mut d, 0, &mut sink), ClimateOutcome::Reading(_)));
        assert_eq!(svc.read_climate(&mut d, 1_999, &mut sink), ClimateOutcome::TooSoon);
        assert!(matches!(svc.read_climate(&mut d, 2_000, &mut sink), ClimateOutcome::Reading(_)));
        assert_eq!(svc.stats().ok, 2);
    }

    #[test]
    fn failures_are_counted_and_reported() {
        let mut svc = AcquisitionService::new(&SensorConfig::default());
        let mut d = decoder(Some(Fault::NoResponse));
        let mut sink = Recorder::default();
        svc.read_climate(&mut d, 0, &mut sink);
        svc.read_climate(&mut d, 5_000, &mut sink);
        let stats = svc.stats();
        assert_eq!(stats.stuck_high, 2);
        assert_eq!(stats.consecutive_failures, 2);
        assert_eq!(
            sink.0.last(),
            Some(&AppEvent::ClimateFault {
                error: OneWireError::StuckHigh,
                consecutive: 2
            })
        );
    }

    #[test]
    fn unclaimed_result_makes_service_back_off() {
        let mut svc = AcquisitionService::new(&SensorConfig::default());
        let mut d = decoder(None);
        d.request().unwrap();
        d.poll();
        let mut sink = Recorder::default();
        assert_eq!(svc.read_climate(&mut d, 0, &mut sink), ClimateOutcome::Busy);
        assert!(sink.0.is_empty());
    }
}
