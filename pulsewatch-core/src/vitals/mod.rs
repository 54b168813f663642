//! Derived vital signs

mod spo2;
mod snapshot;

pub use snapshot::VitalsSnapshot;
pub use spo2::{estimate_spo2, SPO2_BASELINE, SPO2_CEILING, SPO2_FLOOR};
