//! Bounded FIFO window of raw pulse samples

use heapless::Deque;

use crate::config::MAX_WINDOW_CAPACITY;

/// Raw pulse samples in arrival order
///
/// Holds at most `capacity` samples; pushing onto a full window evicts the
/// oldest sample first.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Deque<u16, MAX_WINDOW_CAPACITY>,
    capacity: usize,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(MAX_WINDOW_CAPACITY)
    }
}

impl SampleWindow {
    /// Create an empty window
    ///
    /// `capacity` is clamped to `1..=MAX_WINDOW_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Deque::new(),
            capacity: capacity.clamp(1, MAX_WINDOW_CAPACITY),
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, sample: u16) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        // Cannot fail: capacity <= MAX_WINDOW_CAPACITY and we just made room
        let _ = self.samples.push_back(sample);
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<u16> {
        self.samples.back().copied()
    }

    /// Discard all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// The newest `n` samples, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = u16> + '_ {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().copied().skip(skip)
    }

    /// First differences over the newest `n` samples, oldest first
    ///
    /// Yields `n - 1` values when at least `n` samples are held.
    pub fn differences(&self, n: usize) -> impl Iterator<Item = i32> + '_ {
        let mut previous: Option<u16> = None;
        self.recent(n).filter_map(move |sample| {
            let delta = previous.map(|p| i32::from(sample) - i32::from(p));
            previous = Some(sample);
            delta
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_and_latest() {
        let mut window = SampleWindow::new(4);
        assert!(window.is_empty());
        assert_eq!(window.latest(), None);

        window.push(100);
        window.push(120);
        assert_eq!(window.len(), 2);
        assert_eq!(window.latest(), Some(120));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut window = SampleWindow::new(3);
        for sample in [1, 2, 3, 4, 5] {
            window.push(sample);
        }

        assert_eq!(window.len(), 3);
        let held: Vec<u16> = window.recent(10).collect();
        assert_eq!(held, vec![3, 4, 5]);
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(SampleWindow::new(0).capacity(), 1);
        assert_eq!(SampleWindow::new(10_000).capacity(), MAX_WINDOW_CAPACITY);
        assert_eq!(SampleWindow::default().capacity(), MAX_WINDOW_CAPACITY);
    }

    #[test]
    fn test_recent_takes_newest() {
        let mut window = SampleWindow::new(10);
        for sample in 0..10 {
            window.push(sample);
        }
        let newest: Vec<u16> = window.recent(3).collect();
        assert_eq!(newest, vec![7, 8, 9]);
    }

    #[test]
    fn test_differences() {
        let mut window = SampleWindow::new(10);
        for sample in [500, 510, 490, 600] {
            window.push(sample);
        }

        let all: Vec<i32> = window.differences(4).collect();
        assert_eq!(all, vec![10, -20, 110]);

        let last_two: Vec<i32> = window.differences(2).collect();
        assert_eq!(last_two, vec![110]);
    }

    #[test]
    fn test_differences_need_two_samples() {
        let mut window = SampleWindow::new(10);
        assert_eq!(window.differences(20).count(), 0);
        window.push(42);
        assert_eq!(window.differences(20).count(), 0);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(
            capacity in 1usize..=MAX_WINDOW_CAPACITY,
            samples in proptest::collection::vec(any::<u16>(), 0..700),
        ) {
            let mut window = SampleWindow::new(capacity);
            for &sample in &samples {
                window.push(sample);
                prop_assert!(window.len() <= capacity);
            }

            // Held samples are exactly the newest `capacity` pushed
            let start = samples.len().saturating_sub(capacity);
            let held: Vec<u16> = window.recent(capacity).collect();
            prop_assert_eq!(held, samples[start..].to_vec());
        }
    }
}
