//! Alert routing
//!
//! Two channels with different policies:
//! - Local alarm: sounds for a fixed duration on every tick with alerts
//! - External notification: at most once per notification interval, and the
//!   interval only restarts after a confirmed send
//!
//! Neither channel aborts the tick. An alarm output fault is logged and
//! reported in the outcome, and a later tick retries switching it off.

use embedded_hal::delay::DelayNs;
use pulsewatch_protocol::{AlertNotification, PayloadError};

use crate::config::TimingConfig;
use crate::traits::{AlarmError, AlarmOutput, NotificationSink, SinkError};
use crate::vitals::VitalsSnapshot;

use super::threshold::AlertRecord;

/// What happened to the local alarm on one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmOutcome {
    /// No alerts, alarm left silent
    Silent,
    /// Sounded for the full duration and switched off
    Sounded,
    /// Output could not be driven
    Failed(AlarmError),
}

/// What happened to the external notification on one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotificationOutcome {
    /// No alerts, nothing to send
    Idle,
    /// Alerts present but the interval has not elapsed
    Throttled,
    /// Sink confirmed the send
    Sent,
    /// Sink rejected the send; will retry on the next tick
    Failed(SinkError),
}

/// Result of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchOutcome {
    /// Local alarm result
    pub alarm: AlarmOutcome,
    /// External notification result
    pub notification: NotificationOutcome,
}

impl DispatchOutcome {
    /// Whether the alarm sounded for its full duration
    pub fn alarm_sounded(&self) -> bool {
        self.alarm == AlarmOutcome::Sounded
    }
}

/// Routes alerts to the local alarm and the notification sink
pub struct AlertDispatcher<A, N> {
    alarm: A,
    notifier: N,
    alarm_duration_ms: u32,
    notification_interval_ms: u32,
    last_successful_send_ms: Option<u64>,
}

impl<A: AlarmOutput, N: NotificationSink> AlertDispatcher<A, N> {
    /// Create a dispatcher that has never notified
    pub fn new(alarm: A, notifier: N, timing: &TimingConfig) -> Self {
        Self {
            alarm,
            notifier,
            alarm_duration_ms: timing.alarm_duration_ms,
            notification_interval_ms: timing.notification_interval_ms,
            last_successful_send_ms: None,
        }
    }

    /// Time of the last confirmed notification (ms)
    pub fn last_successful_send_ms(&self) -> Option<u64> {
        self.last_successful_send_ms
    }

    /// The alarm output
    pub fn alarm(&self) -> &A {
        &self.alarm
    }

    /// The notification sink
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Route this tick's alerts
    ///
    /// The notification goes out before the alarm sounds, so a long alarm
    /// never delays it. `delay` blocks for the alarm duration. Only a
    /// notification payload that cannot be built is an error.
    pub fn dispatch<D: DelayNs>(
        &mut self,
        snapshot: &VitalsSnapshot,
        alerts: &[AlertRecord],
        now_ms: u64,
        delay: &mut D,
    ) -> Result<DispatchOutcome, PayloadError> {
        if alerts.is_empty() {
            return Ok(DispatchOutcome {
                alarm: self.silence_alarm(),
                notification: NotificationOutcome::Idle,
            });
        }

        let notification = self.maybe_notify(snapshot, alerts, now_ms)?;
        let alarm = self.sound_alarm(delay);

        Ok(DispatchOutcome {
            alarm,
            notification,
        })
    }

    fn notification_due(&self, now_ms: u64) -> bool {
        match self.last_successful_send_ms {
            None => true,
            Some(last) => {
                now_ms.saturating_sub(last) >= u64::from(self.notification_interval_ms)
            }
        }
    }

    fn maybe_notify(
        &mut self,
        snapshot: &VitalsSnapshot,
        alerts: &[AlertRecord],
        now_ms: u64,
    ) -> Result<NotificationOutcome, PayloadError> {
        if !self.notification_due(now_ms) {
            return Ok(NotificationOutcome::Throttled);
        }

        let notification = AlertNotification::new(
            snapshot.temperature_c,
            snapshot.heart_rate_bpm,
            snapshot.spo2,
            alerts.iter().map(AlertRecord::message),
            snapshot.timestamp,
        )?;

        match self.notifier.notify(&notification) {
            Ok(()) => {
                info!("Alert notification sent ({} alerts)", alerts.len());
                self.last_successful_send_ms = Some(now_ms);
                Ok(NotificationOutcome::Sent)
            }
            Err(e) => {
                warn!("Alert notification failed: {:?}", e);
                Ok(NotificationOutcome::Failed(e))
            }
        }
    }

    /// Sound for the configured duration
    ///
    /// Switching off is attempted even when switching on failed.
    fn sound_alarm<D: DelayNs>(&mut self, delay: &mut D) -> AlarmOutcome {
        let sounded = self.alarm.set_on(true);
        if sounded.is_ok() {
            delay.delay_ms(self.alarm_duration_ms);
        }
        let silenced = self.alarm.set_on(false);

        match sounded.and(silenced) {
            Ok(()) => AlarmOutcome::Sounded,
            Err(e) => {
                error!("Alarm output failed: {:?}", e);
                AlarmOutcome::Failed(e)
            }
        }
    }

    /// Switch off an alarm a previous fault left sounding
    fn silence_alarm(&mut self) -> AlarmOutcome {
        if !self.alarm.is_on() {
            return AlarmOutcome::Silent;
        }

        match self.alarm.set_on(false) {
            Ok(()) => {
                info!("Alarm silenced after output fault");
                AlarmOutcome::Silent
            }
            Err(e) => {
                error!("Alarm still sounding: {:?}", e);
                AlarmOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::evaluate;
    use crate::config::AlertBounds;
    use std::vec::Vec;

    #[derive(Default)]
    struct MockAlarm {
        on: bool,
        activations: u32,
        fail: bool,
        fail_off: bool,
    }

    impl AlarmOutput for MockAlarm {
        fn set_on(&mut self, on: bool) -> Result<(), AlarmError> {
            if self.fail || (self.fail_off && !on) {
                return Err(AlarmError::Output);
            }
            if on && !self.on {
                self.activations += 1;
            }
            self.on = on;
            Ok(())
        }

        fn is_on(&self) -> bool {
            self.on
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        sent: Vec<AlertNotification>,
        fail: bool,
    }

    impl NotificationSink for MockNotifier {
        fn notify(&mut self, notification: &AlertNotification) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Transport);
            }
            self.sent.push(notification.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ms: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += u64::from(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += u64::from(ms);
        }
    }

    fn snapshot(temperature_c: f32) -> VitalsSnapshot {
        VitalsSnapshot {
            temperature_c,
            heart_rate_bpm: 75,
            spo2: 98,
            timestamp: 1_700_000_000,
        }
    }

    fn dispatcher() -> AlertDispatcher<MockAlarm, MockNotifier> {
        AlertDispatcher::new(
            MockAlarm::default(),
            MockNotifier::default(),
            &TimingConfig::default(),
        )
    }

    #[test]
    fn test_no_alerts_is_quiet() {
        let mut dispatcher = dispatcher();
        let mut delay = MockDelay::default();
        let outcome = dispatcher
            .dispatch(&snapshot(36.6), &[], 0, &mut delay)
            .unwrap();

        assert_eq!(outcome.alarm, AlarmOutcome::Silent);
        assert_eq!(outcome.notification, NotificationOutcome::Idle);
        assert_eq!(dispatcher.alarm().activations, 0);
        assert_eq!(delay.total_ms, 0);
    }

    #[test]
    fn test_alerts_sound_alarm_and_notify() {
        let mut dispatcher = dispatcher();
        let mut delay = MockDelay::default();
        let snap = snapshot(29.0);
        let alerts = evaluate(&snap, &AlertBounds::default());

        let outcome = dispatcher.dispatch(&snap, &alerts, 1000, &mut delay).unwrap();

        assert_eq!(outcome.alarm, AlarmOutcome::Sounded);
        assert_eq!(outcome.notification, NotificationOutcome::Sent);
        assert_eq!(dispatcher.alarm().activations, 1);
        assert!(!dispatcher.alarm().is_on());
        assert_eq!(delay.total_ms, 1000);
        assert_eq!(dispatcher.last_successful_send_ms(), Some(1000));

        let sent = &dispatcher.notifier().sent[0];
        assert_eq!(sent.alerts[0].as_str(), "Low temperature: 29.0°C");
        assert_eq!(sent.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_notification_throttled_alarm_not() {
        let mut dispatcher = dispatcher();
        let mut delay = MockDelay::default();
        let snap = snapshot(29.0);
        let alerts = evaluate(&snap, &AlertBounds::default());

        dispatcher.dispatch(&snap, &alerts, 0, &mut delay).unwrap();
        let outcome = dispatcher
            .dispatch(&snap, &alerts, 59_999, &mut delay)
            .unwrap();
        assert_eq!(outcome.notification, NotificationOutcome::Throttled);
        assert!(outcome.alarm_sounded());

        let outcome = dispatcher
            .dispatch(&snap, &alerts, 60_000, &mut delay)
            .unwrap();
        assert_eq!(outcome.notification, NotificationOutcome::Sent);

        assert_eq!(dispatcher.notifier().sent.len(), 2);
        assert_eq!(dispatcher.alarm().activations, 3);
    }

    #[test]
    fn test_failed_send_does_not_advance_throttle() {
        let mut dispatcher = dispatcher();
        let mut delay = MockDelay::default();
        let snap = snapshot(29.0);
        let alerts = evaluate(&snap, &AlertBounds::default());

        dispatcher.notifier.fail = true;
        let outcome = dispatcher.dispatch(&snap, &alerts, 0, &mut delay).unwrap();
        assert_eq!(
            outcome.notification,
            NotificationOutcome::Failed(SinkError::Transport)
        );
        assert_eq!(dispatcher.last_successful_send_ms(), None);

        // Retried on the very next tick
        dispatcher.notifier.fail = false;
        let outcome = dispatcher.dispatch(&snap, &alerts, 100, &mut delay).unwrap();
        assert_eq!(outcome.notification, NotificationOutcome::Sent);
        assert_eq!(dispatcher.last_successful_send_ms(), Some(100));
    }

    #[test]
    fn test_alarm_fault_is_reported_not_raised() {
        let mut dispatcher = dispatcher();
        let mut delay = MockDelay::default();
        let snap = snapshot(29.0);
        let alerts = evaluate(&snap, &AlertBounds::default());

        dispatcher.alarm.fail = true;
        let outcome = dispatcher.dispatch(&snap, &alerts, 0, &mut delay).unwrap();
        assert_eq!(outcome.alarm, AlarmOutcome::Failed(AlarmError::Output));
        assert!(!outcome.alarm_sounded());
        // Notification still went out, and a dead alarm does not hold the tick
        assert_eq!(outcome.notification, NotificationOutcome::Sent);
        assert_eq!(dispatcher.notifier().sent.len(), 1);
        assert_eq!(delay.total_ms, 0);
    }

    #[test]
    fn test_alarm_stuck_on_is_silenced_once_vitals_recover() {
        let mut dispatcher = dispatcher();
        let mut delay = MockDelay::default();
        let snap = snapshot(29.0);
        let alerts = evaluate(&snap, &AlertBounds::default());

        // Switching on works, switching off does not
        dispatcher.alarm.fail_off = true;
        let outcome = dispatcher.dispatch(&snap, &alerts, 0, &mut delay).unwrap();
        assert_eq!(outcome.alarm, AlarmOutcome::Failed(AlarmError::Output));
        assert_eq!(delay.total_ms, 1000);
        assert!(dispatcher.alarm().is_on());

        // Still stuck: the quiet path keeps trying
        let outcome = dispatcher
            .dispatch(&snapshot(36.6), &[], 100, &mut delay)
            .unwrap();
        assert_eq!(outcome.alarm, AlarmOutcome::Failed(AlarmError::Output));
        assert!(dispatcher.alarm().is_on());

        dispatcher.alarm.fail_off = false;
        let outcome = dispatcher
            .dispatch(&snapshot(36.6), &[], 200, &mut delay)
            .unwrap();
        assert_eq!(outcome.alarm, AlarmOutcome::Silent);
        assert_eq!(outcome.notification, NotificationOutcome::Idle);
        assert!(!dispatcher.alarm().is_on());
    }
}
