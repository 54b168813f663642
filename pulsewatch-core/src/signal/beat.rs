//! Derivative-based heartbeat detector
//!
//! A beat is the steep rising or falling edge the KY-039 produces as blood
//! volume changes under the sensor. The detector looks only at the newest
//! sample-to-sample difference inside the detection window:
//!
//! ```text
//!   |delta| > sensitivity  and  elapsed since last beat >= refractory
//!       => accept beat
//! ```
//!
//! The interval between two accepted beats is converted to BPM when it falls
//! inside the plausible range (40-200 BPM by default). Outside that range the
//! beat still resets the interval timer but the previous estimate is kept.

use crate::config::DetectorConfig;

use super::window::SampleWindow;

/// Beat tracking state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DetectorState {
    /// No beat seen within the timeout
    NoSignal,
    /// Beats are being tracked
    Tracking {
        /// Time of the last accepted beat (ms)
        last_beat_ms: u64,
    },
}

/// Streaming heart-rate estimator over raw pulse samples
#[derive(Debug, Clone)]
pub struct BeatDetector {
    config: DetectorConfig,
    window: SampleWindow,
    state: DetectorState,
    last_valid_bpm: Option<u16>,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl BeatDetector {
    /// Create a detector with an empty sample window
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            window: SampleWindow::new(config.window_capacity),
            config,
            state: DetectorState::NoSignal,
            last_valid_bpm: None,
        }
    }

    /// Current tracking state
    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Last BPM computed from an in-range beat interval
    pub fn last_valid_bpm(&self) -> Option<u16> {
        self.last_valid_bpm
    }

    /// The underlying sample window
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Drop the beat being tracked and its estimate
    ///
    /// The sample window is kept. Used when the timebase can no longer be
    /// trusted, so the next edge starts tracking afresh.
    pub fn reset_tracking(&mut self) {
        self.state = DetectorState::NoSignal;
        self.last_valid_bpm = None;
    }

    /// Append a sample taken at `now_ms` and return the heart-rate estimate
    ///
    /// Never fails: anything that prevents an estimate (warm-up, lost
    /// signal, a clock that ran backwards) yields the fallback BPM.
    pub fn observe(&mut self, raw: u16, now_ms: u64) -> u16 {
        self.window.push(raw);

        if self.window.len() < self.config.detection_window {
            return self.config.fallback_bpm;
        }

        if let DetectorState::Tracking { last_beat_ms } = self.state {
            let Some(elapsed) = now_ms.checked_sub(last_beat_ms) else {
                warn!("Pulse sample time {} precedes last beat {}", now_ms, last_beat_ms);
                return self.config.fallback_bpm;
            };
            if elapsed >= u64::from(self.config.beat_timeout_ms) {
                debug!("No beat for {} ms, signal lost", elapsed);
                self.state = DetectorState::NoSignal;
                self.last_valid_bpm = None;
            }
        }

        if !self.edge_detected() {
            return self.current_bpm();
        }

        match self.state {
            DetectorState::NoSignal => {
                trace!("First beat at {} ms", now_ms);
                self.state = DetectorState::Tracking {
                    last_beat_ms: now_ms,
                };
                self.config.fallback_bpm
            }
            DetectorState::Tracking { last_beat_ms } => {
                // Staleness check above already ruled out a backwards clock
                let elapsed = now_ms - last_beat_ms;
                if elapsed < u64::from(self.config.refractory_ms) {
                    return self.current_bpm();
                }

                self.state = DetectorState::Tracking {
                    last_beat_ms: now_ms,
                };
                match self.interval_to_bpm(elapsed) {
                    Some(bpm) => {
                        trace!("Beat interval {} ms, {} BPM", elapsed, bpm);
                        self.last_valid_bpm = Some(bpm);
                        bpm
                    }
                    None => {
                        trace!("Beat interval {} ms out of range", elapsed);
                        self.current_bpm()
                    }
                }
            }
        }
    }

    /// Check the newest difference in the detection window against the sensitivity
    fn edge_detected(&self) -> bool {
        self.window
            .differences(self.config.detection_window)
            .last()
            .is_some_and(|delta| delta.unsigned_abs() > u32::from(self.config.sensitivity))
    }

    fn interval_to_bpm(&self, interval_ms: u64) -> Option<u16> {
        let range = u64::from(self.config.min_interval_ms)..=u64::from(self.config.max_interval_ms);
        if !range.contains(&interval_ms) {
            return None;
        }
        60_000u64
            .checked_div(interval_ms)
            .and_then(|bpm| u16::try_from(bpm).ok())
    }

    fn current_bpm(&self) -> u16 {
        self.last_valid_bpm.unwrap_or(self.config.fallback_bpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASELINE: u16 = 2000;
    const PEAK: u16 = 2200;
    const TICK_MS: u64 = 100;

    /// Feed a flat signal with a single-sample peak at each time in `peaks`
    ///
    /// Returns the estimate produced at every tick up to and including `until_ms`.
    fn run(detector: &mut BeatDetector, peaks: &[u64], until_ms: u64) -> Vec<(u64, u16)> {
        (0..=until_ms / TICK_MS)
            .map(|i| {
                let now = i * TICK_MS;
                let raw = if peaks.contains(&now) { PEAK } else { BASELINE };
                (now, detector.observe(raw, now))
            })
            .collect()
    }

    fn bpm_at(trace: &[(u64, u16)], t: u64) -> u16 {
        trace.iter().find(|(now, _)| *now == t).map(|(_, bpm)| *bpm).unwrap()
    }

    #[test]
    fn test_warm_up_returns_fallback() {
        let mut detector = BeatDetector::default();
        // A peak during warm-up is not examined
        let trace = run(&mut detector, &[1000], 1800);

        assert!(trace.iter().all(|(_, bpm)| *bpm == 75));
        assert_eq!(detector.state(), DetectorState::NoSignal);
    }

    #[test]
    fn test_first_beat_yields_fallback_then_rate() {
        let mut detector = BeatDetector::default();
        let trace = run(&mut detector, &[2500, 3500], 3600);

        assert_eq!(bpm_at(&trace, 2500), 75);
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 3500 }
        );
        assert_eq!(bpm_at(&trace, 3500), 60);
        // Falling edge right after the peak is inside the refractory period
        assert_eq!(bpm_at(&trace, 3600), 60);
        assert_eq!(detector.last_valid_bpm(), Some(60));
    }

    #[test]
    fn test_steady_rhythm() {
        let mut detector = BeatDetector::default();
        let peaks: Vec<u64> = (0..8).map(|i| 2500 + i * 600).collect();
        let trace = run(&mut detector, &peaks, 7000);

        for &peak in &peaks[1..] {
            assert_eq!(bpm_at(&trace, peak), 100);
        }
    }

    #[test]
    fn test_out_of_range_interval_keeps_previous() {
        let mut detector = BeatDetector::default();
        let trace = run(&mut detector, &[2500, 3100, 4800, 5400], 5400);

        assert_eq!(bpm_at(&trace, 3100), 100);
        // 1700 ms is slower than 40 BPM: accepted as a beat, estimate kept
        assert_eq!(bpm_at(&trace, 4800), 100);
        assert_eq!(bpm_at(&trace, 5400), 100);
    }

    #[test]
    fn test_refractory_rejects_close_edges() {
        let config = DetectorConfig {
            sensitivity: 10,
            ..DetectorConfig::default()
        };
        let mut detector = BeatDetector::new(config);
        for i in 0..20 {
            detector.observe(BASELINE, i * 100);
        }

        detector.observe(PEAK, 2000);
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 2000 }
        );

        // Large edges 100 and 200 ms later do not count
        detector.observe(BASELINE, 2100);
        detector.observe(PEAK, 2200);
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 2000 }
        );

        detector.observe(BASELINE, 2300);
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 2300 }
        );
    }

    #[test]
    fn test_sensitivity_is_strict() {
        let mut detector = BeatDetector::default();
        for i in 0..20 {
            detector.observe(BASELINE, i * 100);
        }
        // Exactly the threshold is not an edge
        detector.observe(BASELINE + 50, 2000);
        assert_eq!(detector.state(), DetectorState::NoSignal);

        detector.observe(BASELINE - 1, 2100);
        assert!(matches!(detector.state(), DetectorState::Tracking { .. }));
    }

    #[test]
    fn test_signal_loss_resets() {
        let mut detector = BeatDetector::default();
        let trace = run(&mut detector, &[2500, 3500], 6400);

        assert_eq!(bpm_at(&trace, 6400), 60);
        assert_eq!(detector.observe(BASELINE, 6500), 75);
        assert_eq!(detector.state(), DetectorState::NoSignal);
        assert_eq!(detector.last_valid_bpm(), None);

        // Next beat restarts tracking with the fallback
        assert_eq!(detector.observe(PEAK, 6600), 75);
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 6600 }
        );
    }

    #[test]
    fn test_backwards_clock_yields_fallback() {
        let mut detector = BeatDetector::default();
        run(&mut detector, &[2500, 3500], 3600);

        assert_eq!(detector.observe(BASELINE, 3000), 75);
        // State is left alone
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 3500 }
        );
        assert_eq!(detector.last_valid_bpm(), Some(60));
    }

    #[test]
    fn test_edge_on_timeout_tick_starts_fresh() {
        let mut detector = BeatDetector::default();
        let trace = run(&mut detector, &[2500, 3500, 6500], 6600);

        assert_eq!(bpm_at(&trace, 3500), 60);
        // Timeout reached on the same tick as the edge: the old beat is
        // dropped first, so the edge is a first beat rather than a 3000 ms interval
        assert_eq!(bpm_at(&trace, 6500), 75);
        assert_eq!(detector.last_valid_bpm(), None);
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 6500 }
        );
        assert_eq!(bpm_at(&trace, 6600), 75);
    }

    #[test]
    fn test_reset_tracking_after_clock_regression() {
        let mut detector = BeatDetector::default();
        run(&mut detector, &[2500, 3500], 3600);

        detector.reset_tracking();
        assert_eq!(detector.state(), DetectorState::NoSignal);
        assert_eq!(detector.last_valid_bpm(), None);
        assert_eq!(detector.window().len(), 37);

        // Edges at the regressed time are tracked again right away
        assert_eq!(detector.observe(PEAK, 1000), 75);
        assert_eq!(
            detector.state(),
            DetectorState::Tracking { last_beat_ms: 1000 }
        );
        detector.observe(BASELINE, 1100);
        assert_eq!(detector.observe(PEAK, 1600), 100);
        detector.observe(BASELINE, 1700);
        assert_eq!(detector.observe(PEAK, 2600), 60);
    }

    proptest! {
        #[test]
        fn prop_estimates_and_beat_spacing(
            steps in proptest::collection::vec((any::<u16>(), 0u64..800), 1..400),
        ) {
            let mut detector = BeatDetector::default();
            let mut now = 0u64;
            let mut last_accepted: Option<u64> = None;

            for (raw, step) in steps {
                now += step;
                let bpm = detector.observe(raw, now);
                prop_assert!(bpm == 75 || (40..=200).contains(&bpm));

                if let DetectorState::Tracking { last_beat_ms } = detector.state() {
                    if last_accepted != Some(last_beat_ms) {
                        if let Some(previous) = last_accepted {
                            prop_assert!(last_beat_ms - previous >= 300);
                        }
                        last_accepted = Some(last_beat_ms);
                    }
                }
            }
        }
    }
}
