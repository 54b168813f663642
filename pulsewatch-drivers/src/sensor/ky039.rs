//! KY-039 pulse sensor
//!
//! An IR LED and phototransistor either side of a fingertip. Blood volume
//! changes with each heartbeat modulate the received light, which shows up
//! as small swings on an ADC channel. The raw value is handed on unscaled.

use pulsewatch_core::traits::{PulseSensor, SensorError};

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Readings this close to either rail mean the module is unplugged or shorted
const RAIL_MARGIN: u16 = 10;

/// KY-039 on a 12-bit ADC channel
pub struct Ky039Sensor<ADC> {
    adc: ADC,
    /// ADC full scale (4095 for 12-bit)
    adc_max: u16,
}

impl<ADC> Ky039Sensor<ADC> {
    /// Create a new pulse sensor on a 12-bit ADC channel
    pub fn new(adc: ADC) -> Self {
        Self { adc, adc_max: 4095 }
    }

    /// Check a raw reading against the supply rails
    pub fn check_rails(&self, raw: u16) -> Result<u16, SensorError> {
        if raw > self.adc_max {
            return Err(SensorError::OutOfRange);
        }
        if raw < RAIL_MARGIN || raw > self.adc_max - RAIL_MARGIN {
            return Err(SensorError::Saturated);
        }
        Ok(raw)
    }
}

impl<ADC: AdcReader> PulseSensor for Ky039Sensor<ADC> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let raw = self.adc.read().map_err(|_| SensorError::ConversionError)?;
        self.check_rails(raw)
    }
}

/// Fixed-value ADC for testing
#[cfg(test)]
pub struct DummyAdc(pub Result<u16, ()>);

#[cfg(test)]
impl AdcReader for DummyAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mid_scale_reading() {
        let mut sensor = Ky039Sensor::new(DummyAdc(Ok(2048)));
        assert_eq!(sensor.read_raw(), Ok(2048));
    }

    #[test]
    fn test_rails_are_faults() {
        let mut sensor = Ky039Sensor::new(DummyAdc(Ok(4095)));
        assert_eq!(sensor.read_raw(), Err(SensorError::Saturated));

        let mut sensor = Ky039Sensor::new(DummyAdc(Ok(3)));
        assert_eq!(sensor.read_raw(), Err(SensorError::Saturated));
    }

    #[test]
    fn test_beyond_full_scale() {
        let mut sensor = Ky039Sensor::new(DummyAdc(Ok(5000)));
        assert_eq!(sensor.read_raw(), Err(SensorError::OutOfRange));
    }

    #[test]
    fn test_adc_failure() {
        let mut sensor = Ky039Sensor::new(DummyAdc(Err(())));
        assert_eq!(sensor.read_raw(), Err(SensorError::ConversionError));
    }

    proptest! {
        #[test]
        fn prop_in_range_passes_through(raw in RAIL_MARGIN..=4095 - RAIL_MARGIN) {
            let mut sensor = Ky039Sensor::new(DummyAdc(Ok(raw)));
            prop_assert_eq!(sensor.read_raw(), Ok(raw));
        }
    }
}
