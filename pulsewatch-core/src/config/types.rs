//! Configuration type definitions
//!
//! These types represent the monitor configuration. Defaults are the values
//! the wearable ships with; `MonitorConfig::validate` rejects combinations the
//! pipeline cannot honor.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of raw samples the pulse window can retain
pub const MAX_WINDOW_CAPACITY: usize = 300;

/// Clinical alert thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlertBounds {
    /// Minimum normal temperature (°C)
    pub temp_min_c: f32,
    /// Maximum normal temperature (°C)
    pub temp_max_c: f32,
    /// Minimum normal heart rate (BPM)
    pub hr_min_bpm: u16,
    /// Maximum normal heart rate (BPM)
    pub hr_max_bpm: u16,
    /// Minimum normal SpO2 (%)
    pub spo2_min: u8,
    /// Maximum plausible SpO2 (%)
    ///
    /// Validated but never alerted on; the simulated value is clamped below it.
    pub spo2_max: u8,
}

impl Default for AlertBounds {
    fn default() -> Self {
        Self {
            temp_min_c: 30.0,
            temp_max_c: 37.8,
            hr_min_bpm: 60,
            hr_max_bpm: 100,
            spo2_min: 95,
            spo2_max: 100,
        }
    }
}

/// Beat detector tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Raw samples retained in the window (≤ `MAX_WINDOW_CAPACITY`)
    pub window_capacity: usize,
    /// Most recent samples inspected for a beat
    pub detection_window: usize,
    /// Minimum absolute sample-to-sample change that counts as a beat (raw ADC units)
    pub sensitivity: u16,
    /// Minimum time between two accepted beats (ms)
    pub refractory_ms: u32,
    /// Shortest beat interval converted to BPM (ms)
    pub min_interval_ms: u32,
    /// Longest beat interval converted to BPM (ms)
    pub max_interval_ms: u32,
    /// Time without a beat before tracking is dropped (ms)
    pub beat_timeout_ms: u32,
    /// Heart rate reported when no valid estimate exists (BPM)
    pub fallback_bpm: u16,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_capacity: MAX_WINDOW_CAPACITY,
            detection_window: 20,
            sensitivity: 50,
            refractory_ms: 300,
            min_interval_ms: 300,  // 200 BPM
            max_interval_ms: 1500, // 40 BPM
            beat_timeout_ms: 3000,
            fallback_bpm: 75,
        }
    }
}

/// Loop cadence and rate limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Delay between ticks (ms)
    pub tick_delay_ms: u32,
    /// Backoff after a failed tick (ms)
    pub recovery_backoff_ms: u32,
    /// Minimum time between external notifications (ms)
    pub notification_interval_ms: u32,
    /// Telemetry publish cadence (ms)
    pub telemetry_interval_ms: u32,
    /// How long the alarm sounds per alerting tick (ms)
    pub alarm_duration_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: 100,
            recovery_backoff_ms: 3000,
            notification_interval_ms: 60_000,
            telemetry_interval_ms: 5_000,
            alarm_duration_ms: 1_000,
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    /// Alert thresholds
    pub bounds: AlertBounds,
    /// Beat detector tuning
    pub detector: DetectorConfig,
    /// Loop cadence and rate limits
    pub timing: TimingConfig,
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// temp_min must be below temp_max
    TemperatureRange,
    /// hr_min must be below hr_max
    HeartRateRange,
    /// spo2_min must be below spo2_max, and spo2_max at most 100
    Spo2Range,
    /// Window capacity must be between the detection window and `MAX_WINDOW_CAPACITY`
    WindowCapacity,
    /// Detection window needs at least two samples to form a difference
    DetectionWindow,
    /// min_interval must be non-zero and below max_interval
    BeatIntervalRange,
    /// An interval or timeout that must be non-zero is zero
    ZeroInterval,
}

impl MonitorConfig {
    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = &self.bounds;
        // Negated comparison also rejects NaN
        if !(bounds.temp_min_c < bounds.temp_max_c) {
            return Err(ConfigError::TemperatureRange);
        }
        if bounds.hr_min_bpm >= bounds.hr_max_bpm {
            return Err(ConfigError::HeartRateRange);
        }
        if bounds.spo2_min >= bounds.spo2_max || bounds.spo2_max > 100 {
            return Err(ConfigError::Spo2Range);
        }

        let detector = &self.detector;
        if detector.detection_window < 2 {
            return Err(ConfigError::DetectionWindow);
        }
        if detector.window_capacity < detector.detection_window
            || detector.window_capacity > MAX_WINDOW_CAPACITY
        {
            return Err(ConfigError::WindowCapacity);
        }
        if detector.min_interval_ms == 0 || detector.min_interval_ms >= detector.max_interval_ms {
            return Err(ConfigError::BeatIntervalRange);
        }
        if detector.beat_timeout_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let timing = &self.timing;
        if timing.tick_delay_ms == 0
            || timing.notification_interval_ms == 0
            || timing.telemetry_interval_ms == 0
        {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(())
    }
}
