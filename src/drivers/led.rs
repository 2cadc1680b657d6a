// Pulsebeat - Beat Indicator LED
//
// Simple GPIO-driven LED, lit while a beat is latched.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use crate::sampler::Indicator;

pub struct LedIndicator<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> LedIndicator<'d> {
    pub fn new(pin: PinDriver<'d, AnyOutputPin, Output>) -> Self {
        Self { pin }
    }
}

impl Indicator for LedIndicator<'_> {
    fn set(&mut self, on: bool) {
        let _ = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}
