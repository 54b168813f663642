//! Per-tick vitals snapshot

/// Vital signs captured on one loop tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VitalsSnapshot {
    /// Body temperature (°C)
    pub temperature_c: f32,
    /// Heart rate (BPM)
    pub heart_rate_bpm: u16,
    /// Simulated SpO2 (%)
    pub spo2: u8,
    /// Unix time in seconds
    pub timestamp: u64,
}
