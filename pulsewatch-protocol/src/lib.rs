//! PulseWatch outbound formats
//!
//! This crate defines what leaves the wearable: the telemetry report and the
//! alert notification (JSON documents with a fixed schema), and the UART
//! framing used to hand them to the network gateway.
//!
//! # Link Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 2B BE  │ 1B   │ 0–512B      │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The gateway is a pass-through: it routes each JSON payload to the bus
//! topic or the webhook according to the frame type.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod frame;
pub mod link;
pub mod payload;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_PAYLOAD_SIZE};
pub use link::{DeviceMessage, Destination, ForwardRequest, LinkError};
pub use payload::{
    AlertMessage, AlertNotification, AlertSummary, PayloadError, TelemetryReport, MAX_ALERTS,
    MAX_ALERT_MESSAGE_LEN, TELEMETRY_TOPIC,
};
