//! Board glue between embassy-rp peripherals and the driver traits

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_time::Instant;

use pulsewatch_core::traits::Clock;
use pulsewatch_drivers::sensor::AdcReader;

/// One ADC channel with its converter
pub struct PulseAdc<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
}

impl<'d> PulseAdc<'d> {
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for PulseAdc<'_> {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc.blocking_read(&mut self.channel).map_err(|_| ())
    }
}

/// Uptime clock with a Unix-time origin
///
/// There is no RTC on the board. Wall-clock time starts at the firmware
/// build time, which keeps payload timestamps ordered and roughly right;
/// the gateway may re-stamp on receipt.
pub struct BoardClock {
    epoch_s: u64,
}

impl BoardClock {
    pub fn new() -> Self {
        Self {
            epoch_s: env!("PULSEWATCH_BUILD_EPOCH").parse().unwrap_or(0),
        }
    }
}

impl Clock for BoardClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn unix_time_s(&self) -> u64 {
        self.epoch_s + Instant::now().as_secs()
    }
}
