//! Pulse signal processing
//!
//! Raw KY-039 samples are buffered in a bounded window and scanned for the
//! steep edges that mark a heartbeat.

pub mod beat;
pub mod window;

pub use beat::{BeatDetector, DetectorState};
pub use window::SampleWindow;
