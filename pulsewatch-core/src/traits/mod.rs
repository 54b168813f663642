//! Hardware abstraction traits
//!
//! These traits define the interface between the monitoring logic
//! and hardware-specific implementations.

pub mod alarm;
pub mod clock;
pub mod sensor;
pub mod sink;

pub use alarm::{AlarmError, AlarmOutput};
pub use clock::Clock;
pub use sensor::{PulseSensor, SensorError, TemperatureSensor};
pub use sink::{NotificationSink, SinkError, TelemetrySink};
