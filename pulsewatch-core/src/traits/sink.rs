//! Outbound sink traits
//!
//! The core never opens connections itself. Telemetry and notifications are
//! handed to these sinks, which own whatever transport the board provides.

use pulsewatch_protocol::{AlertNotification, TelemetryReport};

/// Errors delivering a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Payload could not be encoded for the transport
    Encoding,
    /// Transport write failed
    Transport,
    /// Transport is not connected
    Disconnected,
}

/// Periodic telemetry destination (message bus)
pub trait TelemetrySink {
    /// Publish one telemetry report
    fn publish(&mut self, report: &TelemetryReport) -> Result<(), SinkError>;
}

/// External alert notification destination (webhook, mail relay)
pub trait NotificationSink {
    /// Send one alert notification
    ///
    /// `Ok` means the send was confirmed; only then is the throttle advanced.
    fn notify(&mut self, notification: &AlertNotification) -> Result<(), SinkError>;
}
