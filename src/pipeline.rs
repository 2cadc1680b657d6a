// Pulsebeat - Tick Pipeline
//
// One pure step of sampling-to-BPM: detector, then aggregator.  No I/O here;
// the tick task owns the pipeline and does the reading and publishing.

use crate::aggregator::WindowAggregator;
use crate::detector::BeatDetector;
use crate::events::{RawSample, TickOutput};

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    detector: BeatDetector,
    aggregator: WindowAggregator,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, sample: RawSample) -> TickOutput {
        let edge = self.detector.process(sample);
        let ready = self.aggregator.on_tick(edge);
        TickOutput {
            edge,
            ready,
            latched: self.detector.is_latched(),
        }
    }

    pub fn detector(&self) -> &BeatDetector {
        &self.detector
    }

    pub fn aggregator(&self) -> &WindowAggregator {
        &self.aggregator
    }
}
