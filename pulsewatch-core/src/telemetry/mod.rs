//! Periodic telemetry

mod publisher;

pub use publisher::TelemetryPublisher;
