//! Gateway link sinks
//!
//! Telemetry and notifications both travel over the same UART to the
//! network gateway. `GatewayLink` owns the writer; any number of
//! `GatewaySink` handles share it through a `RefCell`, which is enough for
//! the single-threaded monitor loop.

use core::cell::RefCell;

use embedded_io::Write;
use pulsewatch_core::traits::{NotificationSink, SinkError, TelemetrySink};
use pulsewatch_protocol::{AlertNotification, DeviceMessage, TelemetryReport};

/// Framed writer to the gateway
pub struct GatewayLink<W> {
    writer: W,
    frames_sent: u32,
}

impl<W: Write> GatewayLink<W> {
    /// Create a link over a blocking writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frames_sent: 0,
        }
    }

    /// Frame and write one message, then flush
    pub fn send(&mut self, message: DeviceMessage<'_>) -> Result<(), SinkError> {
        let frame = message.to_frame().map_err(|_| SinkError::Encoding)?;
        let bytes = frame.encode_to_vec().map_err(|_| SinkError::Encoding)?;

        self.writer
            .write_all(&bytes)
            .map_err(|_| SinkError::Transport)?;
        self.writer.flush().map_err(|_| SinkError::Transport)?;

        self.frames_sent = self.frames_sent.wrapping_add(1);
        Ok(())
    }

    /// Frames written since creation (wrapping)
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Release the writer
    pub fn release(self) -> W {
        self.writer
    }
}

/// Shared handle implementing both sink traits
pub struct GatewaySink<'a, W> {
    link: &'a RefCell<GatewayLink<W>>,
}

impl<'a, W> GatewaySink<'a, W> {
    pub fn new(link: &'a RefCell<GatewayLink<W>>) -> Self {
        Self { link }
    }
}

impl<W> Clone for GatewaySink<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for GatewaySink<'_, W> {}

impl<W: Write> GatewaySink<'_, W> {
    fn send(&self, message: DeviceMessage<'_>) -> Result<(), SinkError> {
        let mut link = self
            .link
            .try_borrow_mut()
            .map_err(|_| SinkError::Transport)?;
        link.send(message)
    }
}

impl<W: Write> TelemetrySink for GatewaySink<'_, W> {
    fn publish(&mut self, report: &TelemetryReport) -> Result<(), SinkError> {
        self.send(DeviceMessage::Telemetry(report))
    }
}

impl<W: Write> NotificationSink for GatewaySink<'_, W> {
    fn notify(&mut self, notification: &AlertNotification) -> Result<(), SinkError> {
        self.send(DeviceMessage::Notify(notification))
    }
}
