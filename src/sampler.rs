// Pulsebeat - Sampler & Indicator Boundaries
//
// The tick task only ever talks to hardware through these two traits, so the
// same loop runs against the ESP32 ADC/LED and the host simulation.

use crate::config::SAMPLE_MAX;
use crate::events::RawSample;

/// Source of one analog reading per tick.
pub trait Sampler {
    fn read(&mut self) -> RawSample;
}

/// Binary beat indicator (LED).
pub trait Indicator {
    fn set(&mut self, on: bool);
}

impl<F: FnMut() -> RawSample> Sampler for F {
    fn read(&mut self) -> RawSample {
        self()
    }
}

/// Indicator for builds without an LED.
#[derive(Debug, Default)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn set(&mut self, _on: bool) {}
}

/// Scale a raw converter reading in `0..=full_scale` to the 0..=255 sample
/// range. Truncates like a float-to-int cast and clamps readings above full
/// scale.
pub fn scale_reading(raw: u32, full_scale: u32) -> RawSample {
    if full_scale == 0 {
        return 0;
    }
    let scaled = raw.min(full_scale) as u64 * SAMPLE_MAX as u64 / full_scale as u64;
    scaled as RawSample
}
