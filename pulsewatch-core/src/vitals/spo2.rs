//! Simulated blood-oxygen saturation
//!
//! The wearable has no oximeter. SpO2 is approximated from heart rate and
//! temperature so the alerting path has a value to work with; it is not a
//! physiological measurement.

/// Starting point before adjustments (%)
pub const SPO2_BASELINE: u8 = 98;
/// Lowest value reported (%)
pub const SPO2_FLOOR: u8 = 85;
/// Highest value reported (%)
pub const SPO2_CEILING: u8 = 100;

/// Estimate SpO2 from heart rate and temperature
///
/// | Condition            | Adjustment |
/// |----------------------|------------|
/// | heart rate < 60 BPM  | -2         |
/// | heart rate > 100 BPM | -1         |
/// | temperature < 35.0°C | -3         |
/// | temperature > 38.0°C | -2         |
///
/// The result is clamped to `SPO2_FLOOR..=SPO2_CEILING`.
pub fn estimate_spo2(heart_rate_bpm: u16, temperature_c: f32) -> u8 {
    let mut spo2 = SPO2_BASELINE;

    if heart_rate_bpm < 60 {
        spo2 -= 2;
    } else if heart_rate_bpm > 100 {
        spo2 -= 1;
    }

    if temperature_c < 35.0 {
        spo2 -= 3;
    } else if temperature_c > 38.0 {
        spo2 -= 2;
    }

    spo2.clamp(SPO2_FLOOR, SPO2_CEILING)
}
