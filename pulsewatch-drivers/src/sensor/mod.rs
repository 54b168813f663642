//! Vital-sign sensors

pub mod ky039;
pub mod mlx90614;

pub use ky039::{AdcReader, Ky039Sensor};
pub use mlx90614::{Mlx90614, MLX90614_ADDRESS};
