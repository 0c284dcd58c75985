//! Application layer: port traits, outbound events, and the
//! [`AcquisitionService`](service::AcquisitionService) that drives both
//! acquisition regimes from the foreground.

pub mod events;
pub mod ports;
pub mod service;
