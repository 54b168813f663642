//! Simple TOML parser for monitor configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `monitor.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (integer, float)
//! - `[thresholds]`, `[detector]` and `[timing]` section headers
//! - Comments (# ...)
//!
//! Keys not listed in a section are rejected rather than ignored, so a typo
//! cannot silently leave a threshold at its default.

use core::str::FromStr;

use super::types::{ConfigError, MonitorConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a header, a comment nor `key = value`
    InvalidLine,
    /// Key not recognized in the current section
    UnknownKey,
    /// Value could not be parsed as the expected type
    InvalidValue,
    /// Parsed configuration is inconsistent
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Thresholds,
    Detector,
    Timing,
}

/// Parse TOML configuration into a validated `MonitorConfig`
///
/// Keys that are not present keep their default values.
pub fn parse_config(input: &str) -> Result<MonitorConfig, ParseError> {
    let mut config = MonitorConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "thresholds" => Ok(Section::Thresholds),
        "detector" => Ok(Section::Detector),
        "timing" => Ok(Section::Timing),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // No string values in this format, so any '#' starts a comment
    let value = match value.find('#') {
        Some(hash_pos) => value[..hash_pos].trim(),
        None => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a numeric value, allowing `_` digit separators
fn parse_num<T: FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits = heapless::String::<32>::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MonitorConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Thresholds => {
            let bounds = &mut config.bounds;
            match key {
                "temp_min" => bounds.temp_min_c = parse_num(value)?,
                "temp_max" => bounds.temp_max_c = parse_num(value)?,
                "hr_min" => bounds.hr_min_bpm = parse_num(value)?,
                "hr_max" => bounds.hr_max_bpm = parse_num(value)?,
                "spo2_min" => bounds.spo2_min = parse_num(value)?,
                "spo2_max" => bounds.spo2_max = parse_num(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Detector => {
            let detector = &mut config.detector;
            match key {
                "window_capacity" => detector.window_capacity = parse_num(value)?,
                "detection_window" => detector.detection_window = parse_num(value)?,
                "sensitivity" => detector.sensitivity = parse_num(value)?,
                "refractory_ms" => detector.refractory_ms = parse_num(value)?,
                "min_interval_ms" => detector.min_interval_ms = parse_num(value)?,
                "max_interval_ms" => detector.max_interval_ms = parse_num(value)?,
                "beat_timeout_ms" => detector.beat_timeout_ms = parse_num(value)?,
                "fallback_bpm" => detector.fallback_bpm = parse_num(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Timing => {
            let timing = &mut config.timing;
            match key {
                "tick_delay_ms" => timing.tick_delay_ms = parse_num(value)?,
                "recovery_backoff_ms" => timing.recovery_backoff_ms = parse_num(value)?,
                "notification_interval_s" => {
                    let secs: u32 = parse_num(value)?;
                    timing.notification_interval_ms =
                        secs.checked_mul(1000).ok_or(ParseError::InvalidValue)?;
                }
                "telemetry_interval_s" => {
                    let secs: u32 = parse_num(value)?;
                    timing.telemetry_interval_ms =
                        secs.checked_mul(1000).ok_or(ParseError::InvalidValue)?;
                }
                "alarm_duration_ms" => timing.alarm_duration_ms = parse_num(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
    }
    Ok(())
}
