//! Vital-sign sensor traits

/// Errors that can occur reading a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed (NACK, arbitration loss, timeout)
    Bus,
    /// Packet error code did not match the data
    Checksum,
    /// Sensor reported its own error flag
    DeviceFault,
    /// Reading pinned at a supply rail (disconnected or shorted)
    Saturated,
    /// Reading out of expected range
    OutOfRange,
    /// ADC conversion error
    ConversionError,
}

/// Trait for body temperature sensors
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    ///
    /// Takes `&mut self` because bus reads require mutable access.
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Trait for analog pulse sensors
///
/// Implementations return the raw, unfiltered sample; beat detection
/// works on sample-to-sample differences so no scaling is applied.
pub trait PulseSensor {
    /// Read one raw sample
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}
