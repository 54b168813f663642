//! Gateway link messages
//!
//! The device has no network stack of its own. Telemetry and alert
//! notifications are framed and written to a UART; the gateway on the other
//! end owns the bus and webhook connections and forwards each payload
//! unchanged.
//!
//! - Device → Gateway: `TELEMETRY`, `NOTIFY` (JSON payloads)

use crate::frame::{Frame, FrameError};
use crate::payload::{AlertNotification, PayloadError, TelemetryReport, TELEMETRY_TOPIC};

// Message type IDs: Device → Gateway
pub const MSG_TELEMETRY: u8 = 0x10;
pub const MSG_NOTIFY: u8 = 0x11;

/// Errors turning a payload into a link frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Payload could not be serialized
    Payload(PayloadError),
    /// Serialized payload does not fit a frame
    Frame(FrameError),
}

impl From<PayloadError> for LinkError {
    fn from(e: PayloadError) -> Self {
        LinkError::Payload(e)
    }
}

impl From<FrameError> for LinkError {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}

/// Messages from the device to the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceMessage<'a> {
    /// Publish a telemetry report on the bus
    Telemetry(&'a TelemetryReport),
    /// Deliver an alert notification to the webhook
    Notify(&'a AlertNotification),
}

impl<'a> DeviceMessage<'a> {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, LinkError> {
        let (msg_type, json) = match self {
            DeviceMessage::Telemetry(report) => (MSG_TELEMETRY, report.to_json()?),
            DeviceMessage::Notify(notification) => (MSG_NOTIFY, notification.to_json()?),
        };
        Ok(Frame::new(msg_type, &json)?)
    }
}

/// Where the gateway should forward a received payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Destination {
    /// Publish on the telemetry bus topic
    Bus(&'static str),
    /// POST to the notification webhook
    Webhook,
}

/// A device message as seen by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardRequest<'f> {
    /// Where to send the payload
    pub destination: Destination,
    /// JSON document to forward
    pub json: &'f [u8],
}

impl<'f> ForwardRequest<'f> {
    /// Interpret a frame received from the device
    pub fn from_frame(frame: &'f Frame) -> Result<Self, FrameError> {
        let destination = match frame.msg_type {
            MSG_TELEMETRY => Destination::Bus(TELEMETRY_TOPIC),
            MSG_NOTIFY => Destination::Webhook,
            _ => return Err(FrameError::InvalidFrame),
        };
        if frame.payload.is_empty() {
            return Err(FrameError::InvalidFrame);
        }
        Ok(Self {
            destination,
            json: &frame.payload,
        })
    }
}
