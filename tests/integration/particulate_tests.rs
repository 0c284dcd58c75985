//! Integration tests for the interrupt-shared particulate sensor, driven
//! with synthetic edge and overflow events.

use envsense::error::RatioError;
use futures_lite::future;
use envsense::sensors::{ChannelId, Edge, EdgeEvent, ParticulateSensor};

const WINDOW: u64 = 100;
const MODULUS: u32 = 10;

fn sensor() -> ParticulateSensor<2> {
    let s = ParticulateSensor::new(WINDOW, MODULUS);
    s.start_measurement_window();
    s
}

fn edge(s: &ParticulateSensor<2>, channel: ChannelId, edge: Edge, timestamp: u64) {
    s.on_edge(EdgeEvent { channel, edge, timestamp });
}

fn overflows(s: &ParticulateSensor<2>, n: usize) {
    for _ in 0..n {
        s.on_overflow();
    }
}

#[test]
fn quarter_window_low_reads_quarter() {
    let s = sensor();
    edge(&s, ChannelId::P1, Edge::Falling, 10);
    edge(&s, ChannelId::P1, Edge::Rising, 35);
    overflows(&s, 11);
    assert_eq!(s.read_ratio(ChannelId::P1), Ok(0.25));
    assert_eq!(s.read_ratio(ChannelId::P2), Ok(0.0));
}

#[test]
fn ratio_is_not_ready_until_window_closes() {
    let s = sensor();
    overflows(&s, 10);
    assert_eq!(s.read_ratio(ChannelId::P1), Err(RatioError::WindowNotReady));
    s.on_overflow();
    assert!(s.read_ratio(ChannelId::P1).is_ok());
}

#[test]
fn straddling_pulse_is_split_across_windows() {
    let s = sensor();
    overflows(&s, 8);
    edge(&s, ChannelId::P1, Edge::Falling, 90);
    overflows(&s, 3);
    let first = s.read_ratio(ChannelId::P1).unwrap();

    edge(&s, ChannelId::P1, Edge::Rising, 130);
    overflows(&s, 11);
    let second = s.read_ratio(ChannelId::P1).unwrap();

    // 40 ticks low in total: 20 before the boundary at 110, 20 after.
    assert!((first - 0.2).abs() < 1e-6);
    assert!((second - 0.2).abs() < 1e-6);
    assert!((first + second - 0.4).abs() <= MODULUS as f32 / WINDOW as f32);
}

#[test]
fn line_held_low_reads_full_occupancy() {
    let s = sensor();
    edge(&s, ChannelId::P2, Edge::Falling, 0);
    overflows(&s, 11);
    assert_eq!(s.read_ratio(ChannelId::P2), Ok(1.0));
    overflows(&s, 11);
    assert_eq!(s.read_ratio(ChannelId::P2), Ok(1.0));
}

#[test]
fn waiter_receives_closed_window() {
    let s = sensor();
    edge(&s, ChannelId::P1, Edge::Falling, 0);
    edge(&s, ChannelId::P1, Edge::Rising, 50);
    overflows(&s, 11);
    let ratios = future::block_on(s.wait_for_window());
    assert_eq!(ratios, [0.5, 0.0]);
    // The waiter consumed the window.
    assert_eq!(s.take_fresh(), None);
}

#[test]
fn line_already_low_at_start_reads_full_occupancy() {
    let s = ParticulateSensor::<2>::new(WINDOW, MODULUS);
    edge(&s, ChannelId::P1, Edge::Falling, 0);
    s.start_measurement_window();
    overflows(&s, 11);
    assert_eq!(s.read_ratio(ChannelId::P1), Ok(1.0));
    assert_eq!(s.read_ratio(ChannelId::P2), Ok(0.0));
}

#[test]
fn taken_window_is_not_delivered_to_waiter() {
    let s = sensor();
    overflows(&s, 11);
    assert!(s.take_fresh().is_some());

    let pending = future::block_on(future::or(
        async { Some(s.wait_for_window().await) },
        async { None },
    ));
    assert_eq!(pending, None);

    edge(&s, ChannelId::P2, Edge::Falling, 110);
    edge(&s, ChannelId::P2, Edge::Rising, 140);
    overflows(&s, 11);
    assert_eq!(future::block_on(s.wait_for_window()), [0.0, 0.3]);
    assert_eq!(s.take_fresh(), None);
}
