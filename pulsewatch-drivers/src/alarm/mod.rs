//! Local alarm outputs

pub mod buzzer;

pub use buzzer::GpioBuzzer;
