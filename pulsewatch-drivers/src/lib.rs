//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pulsewatch-core for the wearable's components:
//!
//! - Pulse sensor (KY-039 photoplethysmography module on an ADC channel)
//! - Temperature sensor (MLX90614 IR thermometer over SMBus/I2C)
//! - Alarm output (GPIO buzzer)
//! - Telemetry and notification sinks over the gateway UART link

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod alarm;
pub mod gateway;
pub mod sensor;
