//! MLX90614 infrared thermometer
//!
//! Read over SMBus. Each RAM read returns three bytes: data low, data high,
//! and a packet error code (CRC-8, polynomial 0x07) over the whole
//! transaction including address bytes.
//!
//! Temperatures are in units of 0.02 K. Bit 15 of a temperature word is the
//! sensor's error flag.

use embedded_hal::i2c::I2c;
use pulsewatch_core::traits::{SensorError, TemperatureSensor};

/// Factory default SMBus address
pub const MLX90614_ADDRESS: u8 = 0x5A;

/// RAM register: ambient (die) temperature
const REG_TA: u8 = 0x06;
/// RAM register: object temperature, zone 1
const REG_TOBJ1: u8 = 0x07;

const ERROR_FLAG: u16 = 0x8000;
const KELVIN_PER_LSB: f32 = 0.02;
const ZERO_CELSIUS_K: f32 = 273.15;

/// MLX90614 on an I2C bus
pub struct Mlx90614<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mlx90614<I2C> {
    /// Create a driver at the factory default address
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, MLX90614_ADDRESS)
    }

    /// Create a driver at a reprogrammed address
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Object (skin) temperature in °C
    pub fn read_object_celsius(&mut self) -> Result<f32, SensorError> {
        self.read_temperature(REG_TOBJ1)
    }

    /// Ambient (die) temperature in °C
    ///
    /// Also serves as a presence check at boot.
    pub fn read_ambient_celsius(&mut self) -> Result<f32, SensorError> {
        self.read_temperature(REG_TA)
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_temperature(&mut self, register: u8) -> Result<f32, SensorError> {
        let raw = self.read_word(register)?;
        if raw & ERROR_FLAG != 0 {
            return Err(SensorError::DeviceFault);
        }
        Ok(raw_to_celsius(raw))
    }

    fn read_word(&mut self, register: u8) -> Result<u16, SensorError> {
        let mut data = [0u8; 3];
        self.i2c
            .write_read(self.address, &[register], &mut data)
            .map_err(|_| SensorError::Bus)?;

        let write_addr = self.address << 1;
        let pec = crc8(&[write_addr, register, write_addr | 1, data[0], data[1]]);
        if pec != data[2] {
            return Err(SensorError::Checksum);
        }

        Ok(u16::from_le_bytes([data[0], data[1]]))
    }
}

impl<I2C: I2c> TemperatureSensor for Mlx90614<I2C> {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.read_object_celsius()
    }
}

/// Convert a temperature word to °C
pub fn raw_to_celsius(raw: u16) -> f32 {
    f32::from(raw) * KELVIN_PER_LSB - ZERO_CELSIUS_K
}

/// SMBus packet error code
fn crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |crc, &byte| {
        (0..8).fold(crc ^ byte, |crc, _| {
            if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            }
        })
    })
}
