// Pulsebeat - Firmware Entry Point
//
// Start-up sequence:
//   1. Initialise logging.
//   2. Bring up the pulse sensor and beat LED (simulated on the host).
//   3. Create the transport and start advertising.
//   4. Spawn the tick task (2 ms sampling) and the publish task.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pulsebeat::config::*;
use pulsebeat::drivers::log_transport::LogTransport;
use pulsebeat::handoff::{wake_channel, MeasurementSlot};
use pulsebeat::publisher::Publisher;
use pulsebeat::sampler::{Indicator, Sampler};
use pulsebeat::tasks::publish::publish_task;
use pulsebeat::tasks::tick::{self, TickTask};

fn main() -> anyhow::Result<()> {
    init_logging();
    log::info!("Pulsebeat firmware starting…");

    let (sampler, indicator) = peripherals()?;

    // ---- Transport ----------------------------------------------------------
    // The serial console is the only peer; treat it as always connected.
    let transport = LogTransport::new(DeviceInfo::default());
    transport
        .connection()
        .store(true, std::sync::atomic::Ordering::Release);
    let publisher = Publisher::new(transport, PublisherConfig::default());

    // ---- Hand-off -----------------------------------------------------------
    let slot = Arc::new(MeasurementSlot::new());
    let (wake, wake_rx) = wake_channel();

    // ---- Spawn tasks --------------------------------------------------------
    let task = TickTask::new(sampler, indicator, Arc::clone(&slot), wake);
    let stats = task.stats();

    let publish_slot = Arc::clone(&slot);
    thread::Builder::new()
        .name("publish".into())
        .stack_size(STACK_PUBLISH)
        .spawn(move || {
            publish_task(publisher, publish_slot, stats, wake_rx);
        })?;

    // Timer-driven on the device, a paced thread on the host. Must stay
    // alive for as long as sampling should continue.
    let _tick = tick::start(task)?;

    log::info!("Start-up complete, entering normal operation");

    // Main thread has nothing left to do; park it forever.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(target_os = "espidf")]
fn init_logging() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(target_os = "espidf")]
fn peripherals() -> anyhow::Result<(impl Sampler + Send, impl Indicator + Send)> {
    use esp_idf_hal::gpio::{OutputPin, PinDriver};
    use esp_idf_hal::prelude::Peripherals;
    use pulsebeat::drivers::adc::PulseAdc;
    use pulsebeat::drivers::led::LedIndicator;

    let peripherals = Peripherals::take()?;
    // Keep in step with PIN_LED.
    let led = PinDriver::output(peripherals.pins.gpio10.downgrade_output())?;
    log::info!("Beat LED on GPIO{}", PIN_LED);
    Ok((PulseAdc::new()?, LedIndicator::new(led)))
}

#[cfg(not(target_os = "espidf"))]
fn peripherals() -> anyhow::Result<(impl Sampler + Send, impl Indicator + Send)> {
    use pulsebeat::drivers::simu::SimulatedPulse;
    use pulsebeat::sampler::NoIndicator;

    log::info!("No sensor hardware, using a simulated 72 bpm pulse");
    Ok((SimulatedPulse::new(72.0), NoIndicator))
}
