//! Local alarm output trait

/// Errors driving the alarm output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// The output pin could not be driven
    Output,
}

/// Trait for the local audible/visual alarm
///
/// Implementations drive a buzzer, LED or vibration motor.
pub trait AlarmOutput {
    /// Turn the alarm on or off
    fn set_on(&mut self, on: bool) -> Result<(), AlarmError>;

    /// Check if the alarm is currently on
    fn is_on(&self) -> bool;
}
