//! Outbound payload schemas
//!
//! Two JSON documents leave the device:
//! - `TelemetryReport`: published on the telemetry bus every few seconds
//! - `AlertNotification`: posted to the notification webhook while alerts are active
//!
//! Field names on the wire are fixed by the downstream dashboard and mail
//! script, so they are mapped with `serde(rename)` rather than changed.

use alloc::vec::Vec;
use core::fmt::Write;

use heapless::String;
use serde::Serialize;

/// Bus topic the telemetry report is published on
pub const TELEMETRY_TOPIC: &str = "wearable/datos";

/// Maximum number of alert messages carried in one payload (one per alert kind)
pub const MAX_ALERTS: usize = 5;

/// Maximum length of a single alert message in bytes
pub const MAX_ALERT_MESSAGE_LEN: usize = 64;

/// Separator used when alert messages are joined for telemetry
pub const ALERT_SEPARATOR: &str = ", ";

/// Maximum length of the joined alert summary
pub const MAX_ALERT_SUMMARY_LEN: usize =
    MAX_ALERTS * MAX_ALERT_MESSAGE_LEN + (MAX_ALERTS - 1) * ALERT_SEPARATOR.len();

/// A single human-readable alert message
pub type AlertMessage = String<MAX_ALERT_MESSAGE_LEN>;

/// Comma-joined alert messages
pub type AlertSummary = String<MAX_ALERT_SUMMARY_LEN>;

/// Errors building or encoding a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// More alert messages than a payload can carry
    TooManyAlerts,
    /// An alert message exceeds `MAX_ALERT_MESSAGE_LEN`
    MessageTooLong,
    /// JSON serialization failed
    Encoding,
}

/// Periodic telemetry report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryReport {
    /// Temperature (°C), rounded to one decimal
    #[serde(rename = "temperatura")]
    pub temperature_c: f32,
    /// Heart rate (BPM)
    #[serde(rename = "ritmo_cardiaco")]
    pub heart_rate_bpm: u16,
    /// Simulated SpO2 (%)
    pub spo2: u8,
    /// Active alert messages joined with ", ", empty when none
    #[serde(rename = "alertas")]
    pub alerts: AlertSummary,
    /// Unix time in seconds
    pub timestamp: u64,
}

impl TelemetryReport {
    /// Build a report, joining the alert messages into a single string
    pub fn new<'a, I>(
        temperature_c: f32,
        heart_rate_bpm: u16,
        spo2: u8,
        alerts: I,
        timestamp: u64,
    ) -> Result<Self, PayloadError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Ok(Self {
            temperature_c: round_tenths(temperature_c),
            heart_rate_bpm,
            spo2,
            alerts: join_alerts(alerts)?,
            timestamp,
        })
    }

    /// Encode as a JSON document
    pub fn to_json(&self) -> Result<Vec<u8>, PayloadError> {
        serde_json::to_vec(self).map_err(|_| PayloadError::Encoding)
    }
}

/// Alert notification sent to the external webhook
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertNotification {
    /// Temperature (°C), rounded to one decimal
    #[serde(rename = "temperatura")]
    pub temperature_c: f32,
    /// Heart rate (BPM)
    #[serde(rename = "ritmo_cardiaco")]
    pub heart_rate_bpm: u16,
    /// Simulated SpO2 (%)
    pub spo2: u8,
    /// Alert messages in evaluation order
    #[serde(rename = "alertas")]
    pub alerts: heapless::Vec<AlertMessage, MAX_ALERTS>,
    /// Unix time in seconds
    pub timestamp: u64,
}

impl AlertNotification {
    /// Build a notification from the triggered alert messages
    pub fn new<'a, I>(
        temperature_c: f32,
        heart_rate_bpm: u16,
        spo2: u8,
        alerts: I,
        timestamp: u64,
    ) -> Result<Self, PayloadError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut messages = heapless::Vec::new();
        for text in alerts {
            let message = AlertMessage::try_from(text).map_err(|_| PayloadError::MessageTooLong)?;
            messages
                .push(message)
                .map_err(|_| PayloadError::TooManyAlerts)?;
        }

        Ok(Self {
            temperature_c: round_tenths(temperature_c),
            heart_rate_bpm,
            spo2,
            alerts: messages,
            timestamp,
        })
    }

    /// Encode as a JSON document
    pub fn to_json(&self) -> Result<Vec<u8>, PayloadError> {
        serde_json::to_vec(self).map_err(|_| PayloadError::Encoding)
    }
}

/// Round to one decimal place, half away from zero
///
/// `f32::round` is not available in `core`, so this goes through an integer.
pub fn round_tenths(value: f32) -> f32 {
    let scaled = value * 10.0;
    let rounded = if scaled >= 0.0 {
        (scaled + 0.5) as i32
    } else {
        (scaled - 0.5) as i32
    };
    rounded as f32 / 10.0
}

/// Join alert messages with `ALERT_SEPARATOR`
pub fn join_alerts<'a, I>(alerts: I) -> Result<AlertSummary, PayloadError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut summary = AlertSummary::new();
    for (i, text) in alerts.into_iter().enumerate() {
        if i >= MAX_ALERTS {
            return Err(PayloadError::TooManyAlerts);
        }
        if text.len() > MAX_ALERT_MESSAGE_LEN {
            return Err(PayloadError::MessageTooLong);
        }
        if i > 0 {
            summary
                .write_str(ALERT_SEPARATOR)
                .map_err(|_| PayloadError::MessageTooLong)?;
        }
        summary
            .write_str(text)
            .map_err(|_| PayloadError::MessageTooLong)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_tenths() {
        assert_eq!(round_tenths(36.54), 36.5);
        assert_eq!(round_tenths(36.56), 36.6);
        assert_eq!(round_tenths(-2.25), -2.3);
        assert_eq!(round_tenths(0.0), 0.0);
    }

    #[test]
    fn test_join_alerts() {
        let summary = join_alerts(["High heart rate: 110 BPM", "Low SpO2: 90%"]).unwrap();
        assert_eq!(summary.as_str(), "High heart rate: 110 BPM, Low SpO2: 90%");

        let empty = join_alerts([]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_join_rejects_too_many() {
        let result = join_alerts(["a", "b", "c", "d", "e", "f"]);
        assert_eq!(result, Err(PayloadError::TooManyAlerts));
    }

    #[test]
    fn test_telemetry_json_fields() {
        let report = TelemetryReport::new(36.66, 72, 98, [], 1_700_000_000).unwrap();
        let json = report.to_json().unwrap();
        let text = core::str::from_utf8(&json).unwrap();

        assert_eq!(
            text,
            r#"{"temperatura":36.7,"ritmo_cardiaco":72,"spo2":98,"alertas":"","timestamp":1700000000}"#
        );
    }

    #[test]
    fn test_notification_json_carries_alert_list() {
        let notification = AlertNotification::new(
            29.0,
            75,
            98,
            ["Low temperature: 29.0°C"],
            1_700_000_060,
        )
        .unwrap();
        let json = notification.to_json().unwrap();
        let text = core::str::from_utf8(&json).unwrap();

        assert!(text.contains(r#""alertas":["Low temperature: 29.0°C"]"#));
        assert!(text.contains(r#""temperatura":29.0"#));
        assert!(text.contains(r#""timestamp":1700000060"#));
    }

    #[test]
    fn test_notification_rejects_long_message() {
        let long = "x".repeat(MAX_ALERT_MESSAGE_LEN + 1);
        let result = AlertNotification::new(36.0, 70, 98, [long.as_str()], 0);
        assert_eq!(result, Err(PayloadError::MessageTooLong));
    }
}
