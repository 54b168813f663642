//! GPIO buzzer alarm
//!
//! Drives an active buzzer (or a transistor in front of a passive one)
//! from a single output pin.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use pulsewatch_core::traits::{AlarmError, AlarmOutput};

/// GPIO buzzer output
///
/// The pin can be configured as active-high (default) or active-low.
pub struct GpioBuzzer<P> {
    pin: P,
    /// If true, buzzer ON = pin LOW
    inverted: bool,
    /// Current logical state (true = sounding)
    on: bool,
}

impl<P: OutputPin> GpioBuzzer<P> {
    /// Create a new buzzer output, forcing it silent
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the buzzer sounds when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Result<Self, AlarmError> {
        let mut buzzer = Self {
            pin,
            inverted,
            on: false,
        };
        buzzer.set_on(false)?;
        Ok(buzzer)
    }

    /// Create a new buzzer with active-high output
    pub fn new_active_high(pin: P) -> Result<Self, AlarmError> {
        Self::new(pin, false)
    }

    /// Sound for `duration_ms`, then silence
    ///
    /// Used for the power-on chirp; the monitor loop times its own alarms.
    pub fn chirp<D: DelayNs>(&mut self, delay: &mut D, duration_ms: u32) -> Result<(), AlarmError> {
        let sounded = self.set_on(true);
        if sounded.is_ok() {
            delay.delay_ms(duration_ms);
        }
        // Always try to silence, even if switching on failed
        let silenced = self.set_on(false);
        sounded.and(silenced)
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> AlarmOutput for GpioBuzzer<P> {
    fn set_on(&mut self, on: bool) -> Result<(), AlarmError> {
        let result = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| AlarmError::Output)?;
        self.on = on;
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
