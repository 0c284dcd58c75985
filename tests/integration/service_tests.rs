//! Integration tests for the `AcquisitionService` pipeline: sensor intake
//! through to emitted events.

use envsense::adapters::sim::Fault;
use envsense::app::events::AppEvent;
use envsense::app::service::{AcquisitionService, ClimateOutcome};
use envsense::config::SensorConfig;
use envsense::error::OneWireError;
use envsense::onewire::frame::{FrameFormat, RawFrame};
use envsense::sensors::{ChannelId, Edge, ParticulateSensor};

use crate::mock_hw::{EventRecorder, sim_decoder};

#[test]
fn closed_window_is_emitted_once_per_channel() {
    let config = SensorConfig::default();
    let sensor = ParticulateSensor::<2>::new(100, 10);
    let mut svc = AcquisitionService::new(&config);
    let mut sink = EventRecorder::new();

    svc.start(&sensor, &mut sink);
    assert_eq!(sink.last(), Some(&AppEvent::WindowStarted));
    assert!(svc.poll_particulates(&sensor, &mut sink).is_none());

    sensor.on_capture(ChannelId::P2, Edge::Falling, 0);
    sensor.on_capture(ChannelId::P2, Edge::Rising, 5);
    for _ in 0..11 {
        sensor.on_overflow();
    }

    assert_eq!(svc.poll_particulates(&sensor, &mut sink), Some([0.0, 0.05]));
    assert_eq!(sink.ratios(), vec![0.0, 0.05]);
    assert!(svc.poll_particulates(&sensor, &mut sink).is_none());
}

#[test]
fn fault_then_recovery_resets_consecutive_count() {
    let config = SensorConfig::default();
    let mut svc = AcquisitionService::new(&config);
    let mut sink = EventRecorder::new();
    let mut d = sim_decoder(
        RawFrame::encode(FrameFormat::Bits40, 555, -20, 0),
        Some(Fault::StuckLowAtBit(7)),
    );

    assert_eq!(
        svc.read_climate(&mut d, 0, &mut sink),
        ClimateOutcome::Failed(OneWireError::StuckLow)
    );
    assert_eq!(svc.stats().consecutive_failures, 1);

    d.bus_mut().set_fault(None);
    let outcome = svc.read_climate(&mut d, 3_000, &mut sink);
    let ClimateOutcome::Reading(frame) = outcome else {
        panic!("expected reading, got {outcome:?}");
    };
    assert_eq!(frame.temperature, -20);
    assert_eq!(sink.last(), Some(&AppEvent::Climate(frame)));

    let stats = svc.stats();
    assert_eq!(stats.ok, 1);
    assert_eq!(stats.stuck_low, 1);
    assert_eq!(stats.consecutive_failures, 0);
    assert_eq!(stats.failures(), 1);
}
