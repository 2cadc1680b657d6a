// Pulsebeat - Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V), pulse sensor on an ADC pin

use std::time::Duration;

use crate::events::Bpm;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_PULSE_ADC: u32 = 4;   // D2/A2 - PPG sensor output (ADC1 channel 4)
// D10 - Beat indicator LED (active HIGH).  main.rs takes `pins.gpio10`;
// change both together.
pub const PIN_LED: u32 = 10;

// ---------------------------------------------------------------------------
// ADC
// ---------------------------------------------------------------------------
pub const ADC_FULL_SCALE: u32 = 4095; // 12-bit oneshot conversion

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_TICK: usize = 4096;
pub const STACK_PUBLISH: usize = 8192;

// ---------------------------------------------------------------------------
// Detection timing (milliseconds)
// ---------------------------------------------------------------------------
pub const TICK_PERIOD_MS: u32 = 2;                    // 500 Hz sampling
pub const WINDOW_MS: u32 = 15_000;                    // BPM aggregation window
pub const INACTIVITY_CEILING_MS: u32 = 10_000;        // envelope re-learn timeout
pub const BPM_SCALE: u32 = 60_000 / WINDOW_MS;        // beats per window -> per minute

// ---------------------------------------------------------------------------
// Signal envelope
// ---------------------------------------------------------------------------
pub const SAMPLE_MAX: u8 = 255;
pub const DEFAULT_THRESHOLD: i32 = 130;               // seeded threshold
pub const INITIAL_PEAK: i32 = 0;
pub const INITIAL_TROUGH: i32 = 250;

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------
pub const IDLE_MEASUREMENT: Bpm = 7;                  // sent when nothing new is pending
pub const PUBLISH_IDLE_INTERVAL_MS: u64 = WINDOW_MS as u64;

// ---------------------------------------------------------------------------
// Device metadata (announced by the transport)
// ---------------------------------------------------------------------------
pub const DEVICE_NAME: &str = "HRM1";
pub const ADVERTISING_INTERVAL_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorLocation {
    Other,
    Chest,
    Wrist,
    Finger,
    Hand,
    EarLobe,
    Foot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial: &'static str,
    pub hardware_rev: &'static str,
    pub firmware_rev: &'static str,
    pub software_rev: &'static str,
    pub location: SensorLocation,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            name: DEVICE_NAME,
            manufacturer: "ARM",
            model: "Model1",
            serial: "SN1",
            hardware_rev: "hw-rev1",
            firmware_rev: "fw-rev1",
            software_rev: "soft-rev1",
            location: SensorLocation::Other,
        }
    }
}

/// Idle behaviour of the publish task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Value announced when the peer is connected but no window has closed
    /// since the last announcement.
    pub idle_value: Bpm,
    /// Longest the publish task sleeps without a wake from the tick task.
    pub idle_interval: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            idle_value: IDLE_MEASUREMENT,
            idle_interval: Duration::from_millis(PUBLISH_IDLE_INTERVAL_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_fit_the_c3() {
        // ADC1 only exists on GPIO0..=4 of the ESP32-C3.
        assert!(PIN_PULSE_ADC <= 4);
        assert_ne!(PIN_LED, PIN_PULSE_ADC);
        assert!(PIN_LED <= 21);
    }

    #[test]
    fn publisher_defaults_follow_constants() {
        let cfg = PublisherConfig::default();
        assert_eq!(cfg.idle_value, IDLE_MEASUREMENT);
        assert_eq!(cfg.idle_interval, Duration::from_millis(WINDOW_MS as u64));
    }
}
