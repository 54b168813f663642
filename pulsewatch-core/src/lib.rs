//! Board-agnostic monitoring logic for the PulseWatch wearable
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware and sink abstraction traits (sensors, alarm, telemetry, notifications)
//! - Beat detection over the raw pulse signal
//! - Derived vitals (simulated SpO2)
//! - Threshold evaluation and rate-limited alert dispatch
//! - Periodic telemetry publishing
//! - The supervised sampling loop
//! - Configuration type definitions and parsing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod alert;
pub mod config;
pub mod monitor;
pub mod signal;
pub mod telemetry;
pub mod traits;
pub mod vitals;
