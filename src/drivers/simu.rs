// Pulsebeat - Simulated PPG Sensor
//
// Host stand-in for the analog pulse sensor: a sharp systolic bump once per
// beat on top of a slow baseline wander, advanced by one tick per read.

use std::f32::consts::TAU;

use crate::config::{SAMPLE_MAX, TICK_PERIOD_MS};
use crate::events::RawSample;
use crate::sampler::Sampler;

pub struct SimulatedPulse {
    elapsed_ms: u64,
    beats_per_minute: f32,
    baseline: f32,
    amplitude: f32,
}

impl SimulatedPulse {
    pub fn new(beats_per_minute: f32) -> Self {
        Self {
            elapsed_ms: 0,
            beats_per_minute,
            baseline: 110.0,
            amplitude: 90.0,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    fn value_at(&self, ms: f32) -> f32 {
        let beat = ms * self.beats_per_minute / 60_000.0;
        let phase = beat.fract();
        // Narrow raised-cosine pulse over the first third of each beat.
        let pulse = if phase < 1.0 / 3.0 {
            0.5 - 0.5 * (phase * 3.0 * TAU).cos()
        } else {
            0.0
        };
        let wander = (ms / 1000.0 * 0.1 * TAU).sin() * 8.0;
        self.baseline + wander + pulse * self.amplitude
    }
}

impl Sampler for SimulatedPulse {
    fn read(&mut self) -> RawSample {
        let v = self.value_at(self.elapsed_ms as f32);
        self.elapsed_ms += TICK_PERIOD_MS as u64;
        v.clamp(0.0, SAMPLE_MAX as f32) as RawSample
    }
}
