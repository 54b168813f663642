//! PulseWatch - Wearable Vital-Signs Monitor Firmware
//!
//! Main firmware binary for RP2040-based wearables. Samples a KY-039 pulse
//! sensor and an MLX90614 IR thermometer, sounds a buzzer on out-of-range
//! vitals, and hands telemetry and alert notifications to a network gateway
//! over UART.
//!
//! Pin map:
//! - I2C0 SDA GPIO16, SCL GPIO17: MLX90614
//! - ADC0 (GPIO26): KY-039 signal
//! - GPIO5: buzzer
//! - UART0 TX GPIO0: gateway link

#![no_std]
#![no_main]

extern crate alloc;

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::uart::{Config as UartConfig, UartTx};
use embassy_time::Delay;
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use pulsewatch_core::monitor::MonitorLoop;
use pulsewatch_drivers::alarm::GpioBuzzer;
use pulsewatch_drivers::gateway::{GatewayLink, GatewaySink};
use pulsewatch_drivers::sensor::{Ky039Sensor, Mlx90614};

mod board;
mod config;

// Heap allocator for JSON encoding
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 16KB (largest payload is well under 1KB)
const HEAP_SIZE: usize = 16 * 1024;

/// Power-on buzzer chirp (ms)
const CHIRP_MS: u32 = 100;

/// SMBus limit for the MLX90614
const I2C_FREQUENCY_HZ: u32 = 100_000;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("PulseWatch firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let monitor_config = config::load();
    let mut delay = Delay;

    // Temperature: MLX90614 on I2C0
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, i2c_config);
    let mut thermometer = Mlx90614::new(i2c);

    // Probe once; the loop keeps running on the last value if it never answers
    match thermometer.read_ambient_celsius() {
        Ok(ambient) => info!("MLX90614 found, ambient {} C", ambient),
        Err(e) => warn!("MLX90614 not responding: {:?}", e),
    }

    // Pulse: KY-039 on ADC0
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let channel = Channel::new_pin(p.PIN_26, Pull::None);
    let pulse = Ky039Sensor::new(board::PulseAdc::new(adc, channel));

    // Alarm: buzzer on GPIO5, chirp so a dead buzzer is noticed at power-on
    let mut buzzer = unwrap!(GpioBuzzer::new_active_high(Output::new(p.PIN_5, Level::Low)));
    if let Err(e) = buzzer.chirp(&mut delay, CHIRP_MS) {
        warn!("Buzzer self-test failed: {:?}", e);
    }

    // Gateway link: both sinks share UART0
    let uart = UartTx::new_blocking(p.UART0, p.PIN_0, UartConfig::default());
    let link = RefCell::new(GatewayLink::new(uart));
    let sink = GatewaySink::new(&link);

    info!("Gateway link on UART0");

    let mut monitor = MonitorLoop::new(
        monitor_config,
        thermometer,
        pulse,
        buzzer,
        sink,
        sink,
        board::BoardClock::new(),
    );

    // Single blocking loop; nothing else runs on this executor
    monitor.run(&mut delay)
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
