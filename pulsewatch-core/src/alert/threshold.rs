//! Threshold evaluation

use core::fmt::Write;

use heapless::Vec;
use pulsewatch_protocol::{AlertMessage, MAX_ALERTS};

use crate::config::AlertBounds;
use crate::vitals::VitalsSnapshot;

/// Alert condition, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertKind {
    TemperatureLow,
    TemperatureHigh,
    HeartRateLow,
    HeartRateHigh,
    Spo2Low,
}

impl AlertKind {
    /// Fixed severity of this kind
    pub fn severity(self) -> Severity {
        match self {
            AlertKind::Spo2Low => Severity::Critical,
            _ => Severity::Warning,
        }
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    Warning,
    Critical,
}

/// One triggered alert
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertRecord {
    pub kind: AlertKind,
    pub severity: Severity,
    /// Human-readable message carrying the offending value
    pub message: AlertMessage,
}

impl AlertRecord {
    fn new(kind: AlertKind, args: core::fmt::Arguments<'_>) -> Self {
        let mut message = AlertMessage::new();
        // Messages fit for any value a sensor can report; an absurd reading
        // is truncated rather than dropped
        let _ = message.write_fmt(args);
        Self {
            kind,
            severity: kind.severity(),
            message,
        }
    }

    /// Message text
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Alerts raised on one tick, at most one per kind
pub type AlertList = Vec<AlertRecord, MAX_ALERTS>;

/// Evaluate a snapshot against the alert bounds
///
/// Pure and order-stable: temperature (low or high), heart rate (low or
/// high), then SpO2 low.
pub fn evaluate(snapshot: &VitalsSnapshot, bounds: &AlertBounds) -> AlertList {
    let mut alerts = AlertList::new();
    let mut raise = |record: AlertRecord| {
        // At most three records are ever raised
        let _ = alerts.push(record);
    };

    let temp = snapshot.temperature_c;
    if temp < bounds.temp_min_c {
        raise(AlertRecord::new(
            AlertKind::TemperatureLow,
            format_args!("Low temperature: {:.1}°C", temp),
        ));
    } else if temp > bounds.temp_max_c {
        raise(AlertRecord::new(
            AlertKind::TemperatureHigh,
            format_args!("High temperature: {:.1}°C", temp),
        ));
    }

    let hr = snapshot.heart_rate_bpm;
    if hr < bounds.hr_min_bpm {
        raise(AlertRecord::new(
            AlertKind::HeartRateLow,
            format_args!("Low heart rate: {} BPM", hr),
        ));
    } else if hr > bounds.hr_max_bpm {
        raise(AlertRecord::new(
            AlertKind::HeartRateHigh,
            format_args!("High heart rate: {} BPM", hr),
        ));
    }

    if snapshot.spo2 < bounds.spo2_min {
        raise(AlertRecord::new(
            AlertKind::Spo2Low,
            format_args!("Low SpO2: {}%", snapshot.spo2),
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot(temperature_c: f32, heart_rate_bpm: u16, spo2: u8) -> VitalsSnapshot {
        VitalsSnapshot {
            temperature_c,
            heart_rate_bpm,
            spo2,
            timestamp: 0,
        }
    }

    fn kinds(alerts: &AlertList) -> std::vec::Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_normal_vitals_raise_nothing() {
        let alerts = evaluate(&snapshot(36.6, 72, 98), &AlertBounds::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_low_temperature_only() {
        let alerts = evaluate(&snapshot(29.0, 75, 98), &AlertBounds::default());

        assert_eq!(kinds(&alerts), [AlertKind::TemperatureLow]);
        assert_eq!(alerts[0].message(), "Low temperature: 29.0°C");
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_high_heart_rate_and_low_spo2() {
        let alerts = evaluate(&snapshot(34.0, 110, 90), &AlertBounds::default());

        assert_eq!(
            kinds(&alerts),
            [AlertKind::HeartRateHigh, AlertKind::Spo2Low]
        );
        assert_eq!(alerts[0].message(), "High heart rate: 110 BPM");
        assert_eq!(alerts[1].message(), "Low SpO2: 90%");
        assert_eq!(alerts[1].severity, Severity::Critical);
    }

    #[test]
    fn test_everything_out_of_range() {
        let alerts = evaluate(&snapshot(39.2, 45, 80), &AlertBounds::default());

        assert_eq!(
            kinds(&alerts),
            [
                AlertKind::TemperatureHigh,
                AlertKind::HeartRateLow,
                AlertKind::Spo2Low
            ]
        );
        assert_eq!(alerts[0].message(), "High temperature: 39.2°C");
        assert_eq!(alerts[1].message(), "Low heart rate: 45 BPM");
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let alerts = evaluate(&snapshot(30.0, 100, 95), &AlertBounds::default());
        assert!(alerts.is_empty());

        let alerts = evaluate(&snapshot(37.8, 60, 100), &AlertBounds::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_custom_bounds() {
        let bounds = AlertBounds {
            hr_max_bpm: 120,
            ..AlertBounds::default()
        };
        let alerts = evaluate(&snapshot(36.6, 110, 98), &bounds);
        assert!(alerts.is_empty());
    }

    proptest! {
        #[test]
        fn prop_pure_and_ordered(
            temp in -40.0f32..80.0,
            hr in 0u16..300,
            spo2 in 0u8..=100,
        ) {
            let snap = snapshot(temp, hr, spo2);
            let bounds = AlertBounds::default();

            let first = evaluate(&snap, &bounds);
            let second = evaluate(&snap, &bounds);
            prop_assert_eq!(&first, &second);

            // Strictly increasing kinds: ordered, and low/high never both present
            for pair in first.windows(2) {
                prop_assert!(pair[0].kind < pair[1].kind);
            }
            let temp_alerts = first
                .iter()
                .filter(|a| matches!(a.kind, AlertKind::TemperatureLow | AlertKind::TemperatureHigh))
                .count();
            let hr_alerts = first
                .iter()
                .filter(|a| matches!(a.kind, AlertKind::HeartRateLow | AlertKind::HeartRateHigh))
                .count();
            prop_assert!(temp_alerts <= 1);
            prop_assert!(hr_alerts <= 1);
        }
    }
}
