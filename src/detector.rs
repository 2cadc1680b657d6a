// Pulsebeat - Beat Detector
//
// Adaptive-threshold beat detection over the raw PPG stream.  The threshold
// sits at the midpoint of the observed [trough, peak] envelope; the envelope
// is forgotten after INACTIVITY_CEILING_MS without a new extreme so the
// detector can re-learn after the finger moves or the sensor is re-seated.
// One beat is emitted per rising crossing; the latch holds until the signal
// falls back below the threshold.

use crate::config::*;
use crate::events::{BeatEdge, RawSample};

#[derive(Debug, Clone)]
pub struct BeatDetector {
    threshold: i32,
    peak: i32,
    trough: i32,
    inactivity_ms: u32,
    latched: bool,
    envelope_resets: u32,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            peak: INITIAL_PEAK,
            trough: INITIAL_TROUGH,
            inactivity_ms: 0,
            latched: false,
            envelope_resets: 0,
        }
    }

    /// Feed one sample. Call exactly once per tick.
    pub fn process(&mut self, sample: RawSample) -> Option<BeatEdge> {
        let s = sample as i32;
        self.inactivity_ms = self.inactivity_ms.saturating_add(TICK_PERIOD_MS);

        if s > self.threshold && s > self.peak {
            self.peak = s;
            self.inactivity_ms = 0;
            self.update_threshold();
        } else if s < self.threshold && s < self.trough {
            self.trough = s;
            self.inactivity_ms = 0;
            self.update_threshold();
        }

        if self.inactivity_ms >= INACTIVITY_CEILING_MS {
            if self.peak != INITIAL_PEAK || self.trough != INITIAL_TROUGH {
                self.envelope_resets = self.envelope_resets.wrapping_add(1);
            }
            // Threshold is deliberately left where it was.
            self.peak = INITIAL_PEAK;
            self.trough = INITIAL_TROUGH;
            self.inactivity_ms = INACTIVITY_CEILING_MS;
        }

        if s > self.threshold && !self.latched {
            self.latched = true;
            return Some(BeatEdge);
        } else if s < self.threshold && self.latched {
            self.latched = false;
        }
        None
    }

    /// Move the threshold to the envelope midpoint, but only once the
    /// envelope has been seeded and is not inverted.
    fn update_threshold(&mut self) {
        let seeded = self.peak != INITIAL_PEAK || self.trough != INITIAL_TROUGH;
        if seeded && self.peak > self.trough {
            self.threshold = (self.peak + self.trough) / 2;
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn peak(&self) -> i32 {
        self.peak
    }

    pub fn trough(&self) -> i32 {
        self.trough
    }

    pub fn inactivity_ms(&self) -> u32 {
        self.inactivity_ms
    }

    /// Number of times a learned envelope was dropped for inactivity.
    pub fn envelope_resets(&self) -> u32 {
        self.envelope_resets
    }

    /// True while the signal is above threshold within one beat.
    pub fn is_latched(&self) -> bool {
        self.latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TICKS_TO_CEILING: usize = (INACTIVITY_CEILING_MS / TICK_PERIOD_MS) as usize;

    fn feed(det: &mut BeatDetector, samples: &[u8]) -> usize {
        samples.iter().filter(|&&s| det.process(s).is_some()).count()
    }

    #[test]
    fn starts_seeded() {
        let det = BeatDetector::new();
        assert_eq!(det.threshold(), 130);
        assert_eq!(det.peak(), 0);
        assert_eq!(det.trough(), 250);
        assert!(!det.is_latched());
    }

    #[test]
    fn first_peak_does_not_move_threshold() {
        // peak 200 vs untouched trough 250: envelope inverted, threshold stays.
        let mut det = BeatDetector::new();
        assert_eq!(det.process(200), Some(BeatEdge));
        assert_eq!(det.peak(), 200);
        assert_eq!(det.threshold(), 130);
        assert!(det.is_latched());
    }

    #[test]
    fn trough_then_centers_threshold() {
        let mut det = BeatDetector::new();
        det.process(200);
        assert_eq!(det.process(50), None);
        assert_eq!(det.trough(), 50);
        assert_eq!(det.threshold(), 125);
        assert!(!det.is_latched());
    }

    #[test]
    fn one_edge_per_crossing() {
        let mut det = BeatDetector::new();
        assert_eq!(feed(&mut det, &[200, 210, 220, 215, 205]), 1);
        assert_eq!(feed(&mut det, &[40, 30, 60]), 0);
        assert_eq!(feed(&mut det, &[180, 190]), 1);
    }

    #[test]
    fn sample_equal_to_threshold_neither_arms_nor_fires() {
        let mut det = BeatDetector::new();
        assert_eq!(feed(&mut det, &[130; 100]), 0);
        det.process(200);
        assert!(det.is_latched());
        // Sitting exactly on the threshold keeps the latch.
        det.process(130);
        assert!(det.is_latched());
    }

    #[test]
    fn flat_signal_resets_envelope_but_not_threshold() {
        let mut det = BeatDetector::new();
        det.process(200);
        det.process(50);
        assert_eq!(det.threshold(), 125);

        // 100 sits inside the envelope: no new extreme.
        for _ in 0..TICKS_TO_CEILING - 1 {
            det.process(100);
        }
        assert_eq!(det.peak(), 200);
        assert_eq!(det.trough(), 50);

        det.process(100);
        assert_eq!(det.peak(), 0);
        assert_eq!(det.trough(), 250);
        assert_eq!(det.threshold(), 125);
        assert_eq!(det.inactivity_ms(), INACTIVITY_CEILING_MS);
        assert_eq!(det.envelope_resets(), 1);

        // A sample on the threshold is neither a peak nor a trough, so the
        // timer stays clamped and the empty envelope is not counted again.
        for _ in 0..10 {
            det.process(125);
            assert_eq!(det.inactivity_ms(), INACTIVITY_CEILING_MS);
        }
        assert_eq!((det.peak(), det.trough()), (INITIAL_PEAK, INITIAL_TROUGH));
        assert_eq!(det.envelope_resets(), 1);
    }

    #[test]
    fn after_reset_new_trough_is_learned_without_moving_threshold() {
        let mut det = BeatDetector::new();
        det.process(200);
        det.process(50);
        for _ in 0..TICKS_TO_CEILING {
            det.process(100);
        }
        det.process(100);
        // 100 < 125 and < 250: becomes the trough, but peak 0 < trough.
        assert_eq!(det.trough(), 100);
        assert_eq!(det.threshold(), 125);
        assert_eq!(det.inactivity_ms(), 0);
    }

    proptest! {
        #[test]
        fn envelope_stays_in_sample_range(samples in proptest::collection::vec(any::<u8>(), 1..2000)) {
            let mut det = BeatDetector::new();
            for s in samples {
                det.process(s);
                prop_assert!(det.peak() <= 255);
                prop_assert!(det.trough() >= 0);
                prop_assert!(det.inactivity_ms() <= INACTIVITY_CEILING_MS);
            }
        }

        #[test]
        fn threshold_tracks_envelope_midpoint(samples in proptest::collection::vec(any::<u8>(), 1..2000)) {
            let mut det = BeatDetector::new();
            for s in samples {
                let before = det.threshold();
                let (peak, trough) = (det.peak(), det.trough());
                det.process(s);
                let envelope_moved = det.peak() != peak || det.trough() != trough;
                let seeded = det.peak() != INITIAL_PEAK || det.trough() != INITIAL_TROUGH;
                if !envelope_moved {
                    prop_assert_eq!(det.threshold(), before);
                } else if seeded && det.peak() > det.trough() {
                    prop_assert_eq!(det.threshold(), (det.peak() + det.trough()) / 2);
                }
            }
        }

        #[test]
        fn edges_alternate_with_releases(samples in proptest::collection::vec(any::<u8>(), 1..2000)) {
            let mut det = BeatDetector::new();
            let mut was_latched = false;
            for s in samples {
                let edge = det.process(s);
                if edge.is_some() {
                    // A new edge only ever follows a released latch.
                    prop_assert!(!was_latched);
                    prop_assert!(det.is_latched());
                }
                if was_latched && !det.is_latched() {
                    prop_assert!(edge.is_none());
                }
                was_latched = det.is_latched();
            }
        }
    }
}
