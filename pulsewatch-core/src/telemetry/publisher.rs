//! Interval-gated telemetry publishing
//!
//! The current snapshot is published whether or not alerts are active.
//! A failed publish leaves the interval timer alone so the next tick retries.

use pulsewatch_protocol::{PayloadError, TelemetryReport};

use crate::alert::AlertRecord;
use crate::config::TimingConfig;
use crate::traits::TelemetrySink;
use crate::vitals::VitalsSnapshot;

/// Publishes snapshots to the telemetry sink at a fixed cadence
pub struct TelemetryPublisher<S> {
    sink: S,
    interval_ms: u32,
    last_publish_ms: Option<u64>,
}

impl<S: TelemetrySink> TelemetryPublisher<S> {
    pub fn new(sink: S, timing: &TimingConfig) -> Self {
        Self {
            sink,
            interval_ms: timing.telemetry_interval_ms,
            last_publish_ms: None,
        }
    }

    /// Time of the last successful publish (ms)
    pub fn last_publish_ms(&self) -> Option<u64> {
        self.last_publish_ms
    }

    /// The telemetry sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn due(&self, now_ms: u64) -> bool {
        match self.last_publish_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(self.interval_ms),
        }
    }

    /// Publish if the interval has elapsed
    ///
    /// Returns `Ok(true)` when a report was published. Sink failures are
    /// logged and reported as `Ok(false)`; only a report that cannot be
    /// built is an error.
    pub fn maybe_publish(
        &mut self,
        snapshot: &VitalsSnapshot,
        alerts: &[AlertRecord],
        now_ms: u64,
    ) -> Result<bool, PayloadError> {
        if !self.due(now_ms) {
            return Ok(false);
        }

        let report = TelemetryReport::new(
            snapshot.temperature_c,
            snapshot.heart_rate_bpm,
            snapshot.spo2,
            alerts.iter().map(AlertRecord::message),
            snapshot.timestamp,
        )?;

        match self.sink.publish(&report) {
            Ok(()) => {
                debug!("Telemetry published at {} ms", now_ms);
                self.last_publish_ms = Some(now_ms);
                Ok(true)
            }
            Err(e) => {
                warn!("Telemetry publish failed: {:?}", e);
                Ok(false)
            }
        }
    }
}
