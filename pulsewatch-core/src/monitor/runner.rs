//! Monitor loop
//!
//! One tick:
//!
//! ```text
//! read temperature ─┐
//! read raw pulse ───┼─> BeatDetector ─> estimate_spo2 ─> evaluate
//!                   │                                       │
//!                   │              ┌────────────────────────┤
//!                   │              v                        v
//!                   │      AlertDispatcher          TelemetryPublisher
//!                   └──────────── sleep tick delay ─────────┘
//! ```
//!
//! Read, publish, notification and alarm output failures are logged and the
//! tick carries on. Anything that escapes the tick moves the loop to
//! `Recovering` for the backoff period.

use embedded_hal::delay::DelayNs;
use pulsewatch_protocol::PayloadError;

use crate::alert::{evaluate, AlertDispatcher, AlertList, DispatchOutcome};
use crate::config::MonitorConfig;
use crate::signal::BeatDetector;
use crate::telemetry::TelemetryPublisher;
use crate::traits::{
    AlarmOutput, Clock, NotificationSink, PulseSensor, TelemetrySink, TemperatureSensor,
};
use crate::vitals::{estimate_spo2, VitalsSnapshot};

use super::state::LoopState;

/// Heart rate reported before the first pulse sample (BPM)
pub const INITIAL_HEART_RATE_BPM: u16 = 75;

/// SpO2 reported before the first pulse sample (%)
pub const INITIAL_SPO2: u8 = 97;

/// Errors that abort a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickError {
    /// Outbound payload exceeded its bounded capacity
    Payload(PayloadError),
    /// Monotonic clock reported an earlier time than the previous tick
    ClockWentBackwards { previous_ms: u64, now_ms: u64 },
}

impl From<PayloadError> for TickError {
    fn from(e: PayloadError) -> Self {
        TickError::Payload(e)
    }
}

/// What one completed tick observed and did
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Vitals evaluated on this tick
    pub snapshot: VitalsSnapshot,
    /// Alerts raised on this tick
    pub alerts: AlertList,
    /// Alarm and notification result
    pub dispatch: DispatchOutcome,
    /// Whether telemetry was published
    pub published: bool,
}

/// The supervised sampling loop
///
/// Owns every collaborator and all state that persists across ticks.
pub struct MonitorLoop<T, P, A, N, S, C> {
    config: MonitorConfig,
    temp_sensor: T,
    pulse_sensor: P,
    detector: BeatDetector,
    dispatcher: AlertDispatcher<A, N>,
    publisher: TelemetryPublisher<S>,
    clock: C,
    state: LoopState,
    temperature_c: f32,
    heart_rate_bpm: u16,
    spo2: u8,
    last_raw: Option<u16>,
    last_tick_ms: Option<u64>,
}

impl<T, P, A, N, S, C> MonitorLoop<T, P, A, N, S, C>
where
    T: TemperatureSensor,
    P: PulseSensor,
    A: AlarmOutput,
    N: NotificationSink,
    S: TelemetrySink,
    C: Clock,
{
    /// Create a loop from its collaborators
    ///
    /// `config` is expected to have passed `MonitorConfig::validate`.
    pub fn new(
        config: MonitorConfig,
        temp_sensor: T,
        pulse_sensor: P,
        alarm: A,
        notifier: N,
        telemetry: S,
        clock: C,
    ) -> Self {
        Self {
            detector: BeatDetector::new(config.detector),
            dispatcher: AlertDispatcher::new(alarm, notifier, &config.timing),
            publisher: TelemetryPublisher::new(telemetry, &config.timing),
            config,
            temp_sensor,
            pulse_sensor,
            clock,
            state: LoopState::Running,
            temperature_c: 0.0,
            heart_rate_bpm: INITIAL_HEART_RATE_BPM,
            spo2: INITIAL_SPO2,
            last_raw: None,
            last_tick_ms: None,
        }
    }

    /// Current supervision state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The beat detector
    pub fn detector(&self) -> &BeatDetector {
        &self.detector
    }

    /// The alert dispatcher
    pub fn dispatcher(&self) -> &AlertDispatcher<A, N> {
        &self.dispatcher
    }

    /// The telemetry publisher
    pub fn publisher(&self) -> &TelemetryPublisher<S> {
        &self.publisher
    }

    /// Run one tick body without the trailing delay
    ///
    /// `delay` is only used to hold the alarm on.
    pub fn tick<D: DelayNs>(&mut self, delay: &mut D) -> Result<TickReport, TickError> {
        let now_ms = self.clock.now_ms();
        if let Some(previous_ms) = self.last_tick_ms.replace(now_ms) {
            if now_ms < previous_ms {
                // Beat timestamps now lie in the future
                self.detector.reset_tracking();
                return Err(TickError::ClockWentBackwards {
                    previous_ms,
                    now_ms,
                });
            }
        }

        match self.temp_sensor.read_celsius() {
            Ok(celsius) => self.temperature_c = celsius,
            Err(e) => warn!("Temperature read failed: {:?}", e),
        }

        match self.pulse_sensor.read_raw() {
            Ok(raw) => self.last_raw = Some(raw),
            // Re-feeding the last sample keeps detection cadence and staleness moving
            Err(e) => warn!("Pulse read failed: {:?}", e),
        }

        if let Some(raw) = self.last_raw {
            self.heart_rate_bpm = self.detector.observe(raw, now_ms);
            self.spo2 = estimate_spo2(self.heart_rate_bpm, self.temperature_c);
        }

        let snapshot = VitalsSnapshot {
            temperature_c: self.temperature_c,
            heart_rate_bpm: self.heart_rate_bpm,
            spo2: self.spo2,
            timestamp: self.clock.unix_time_s(),
        };
        trace!(
            "Vitals: {} C, {} BPM, {} %",
            snapshot.temperature_c,
            snapshot.heart_rate_bpm,
            snapshot.spo2
        );

        let alerts = evaluate(&snapshot, &self.config.bounds);
        for alert in alerts.iter() {
            warn!("Alert: {:?} {:?}", alert.kind, alert.severity);
        }

        let dispatch = self.dispatcher.dispatch(&snapshot, &alerts, now_ms, delay)?;
        let published = self.publisher.maybe_publish(&snapshot, &alerts, now_ms)?;

        Ok(TickReport {
            snapshot,
            alerts,
            dispatch,
            published,
        })
    }

    /// Run one supervised iteration
    ///
    /// On success the tick delay follows the tick. On failure the loop enters
    /// `Recovering` and sleeps the backoff; the error is returned for
    /// reporting only, the next call resumes normally.
    pub fn run_once<D: DelayNs>(&mut self, delay: &mut D) -> Result<TickReport, TickError> {
        if self.state.is_recovering() {
            info!("Monitor loop resuming");
            self.state = LoopState::Running;
        }

        match self.tick(delay) {
            Ok(report) => {
                delay.delay_ms(self.config.timing.tick_delay_ms);
                Ok(report)
            }
            Err(e) => {
                error!(
                    "Tick failed: {:?}, backing off {} ms",
                    e, self.config.timing.recovery_backoff_ms
                );
                self.state = LoopState::Recovering;
                delay.delay_ms(self.config.timing.recovery_backoff_ms);
                Err(e)
            }
        }
    }

    /// Run forever
    pub fn run<D: DelayNs>(&mut self, delay: &mut D) -> ! {
        info!("Monitor loop started");
        loop {
            // Failures are logged and backed off inside run_once
            let _ = self.run_once(delay);
        }
    }
}
