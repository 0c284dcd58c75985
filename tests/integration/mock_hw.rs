//! Shared fixtures for integration tests.
//!
//! Builds decoders on top of the simulated sensor bus and records every
//! emitted event so tests can assert on the full history.

use envsense::adapters::sim::{Fault, SimClock, SimSensorBus};
use envsense::app::events::AppEvent;
use envsense::app::ports::EventSink;
use envsense::config::SensorConfig;
use envsense::onewire::OneWireDecoder;
use envsense::onewire::frame::RawFrame;

pub type SimDecoder = OneWireDecoder<SimSensorBus, SimClock>;

/// Decoder wired to a simulated sensor answering with `frame`.
/// The decoder expects the frame's own layout.
pub fn sim_decoder(frame: RawFrame, fault: Option<Fault>) -> SimDecoder {
    let config = SensorConfig {
        frame_format: frame.format(),
        ..SensorConfig::default()
    };
    let clock = SimClock::new(1_000_000);
    let bus = SimSensorBus::new(&clock, frame, fault);
    OneWireDecoder::from_config(bus, clock, &config)
}

// ── EventRecorder ─────────────────────────────────────────────

pub struct EventRecorder {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventRecorder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }

    pub fn ratios(&self) -> Vec<f32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ParticulateRatio { ratio, .. } => Some(*ratio),
                _ => None,
            })
            .collect()
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventRecorder {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
