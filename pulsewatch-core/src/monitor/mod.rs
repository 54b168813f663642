//! Supervised sampling loop
//!
//! Wires sensors, the beat detector, threshold evaluation, alert dispatch
//! and telemetry together and keeps the cadence.

pub mod runner;
pub mod state;

pub use runner::{MonitorLoop, TickError, TickReport, INITIAL_HEART_RATE_BPM, INITIAL_SPO2};
pub use state::LoopState;
