//! Time source trait

/// Monotonic and wall-clock time
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin; never expected to decrease
    fn now_ms(&self) -> u64;

    /// Unix time in seconds, used to stamp outbound payloads
    fn unix_time_s(&self) -> u64;
}
