// Pulsebeat - Tick Task
//
// Fixed-rate sampling (TICK_PERIOD_MS).  Each tick reads one sample, runs it
// through the detection pipeline, mirrors the beat latch on the indicator and
// hands closed-window results to the publish task.  The tick path never logs
// or blocks; everything worth reporting goes into `TickStats` for the publish
// task to print.
//
// On the device the tick is driven by an esp_timer task timer, because
// sub-FreeRTOS-tick sleeps busy-wait.  On the host a thread paces itself with
// `Instant`.

use std::sync::Arc;

use crate::config::*;
use crate::events::TickOutput;
use crate::handoff::{MeasurementSlot, TickStats, WakeSignal};
use crate::pipeline::Pipeline;
use crate::sampler::{Indicator, Sampler};

pub struct TickTask<S, I> {
    sampler: S,
    indicator: I,
    pipeline: Pipeline,
    slot: Arc<MeasurementSlot>,
    stats: Arc<TickStats>,
    wake: WakeSignal,
    latched: bool,
}

impl<S: Sampler, I: Indicator> TickTask<S, I> {
    /// The indicator is switched on at boot and stays on until the first
    /// beat has been seen and released.
    pub fn new(
        sampler: S,
        mut indicator: I,
        slot: Arc<MeasurementSlot>,
        wake: WakeSignal,
    ) -> Self {
        indicator.set(true);
        Self {
            sampler,
            indicator,
            pipeline: Pipeline::new(),
            slot,
            stats: Arc::new(TickStats::new()),
            wake,
            latched: false,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Shared handle to the counters this task updates.
    pub fn stats(&self) -> Arc<TickStats> {
        Arc::clone(&self.stats)
    }

    /// Run one tick. Returns `None` once the publish task has gone away.
    pub fn step(&mut self) -> Option<TickOutput> {
        let sample = self.sampler.read();
        let out = self.pipeline.tick(sample);

        if out.latched != self.latched {
            self.latched = out.latched;
            self.indicator.set(out.latched);
        }

        if let Some(ready) = out.ready {
            self.stats.record_detector(self.pipeline.detector());
            // Value and ready flag go out together; then wake the reader.
            self.slot.publish(ready.0);
            if !self.wake.wake() {
                return None;
            }
        }
        Some(out)
    }
}

// ---------------------------------------------------------------------------
// Device: esp_timer periodic callback
// ---------------------------------------------------------------------------

/// Keeps the tick running; dropping it stops the timer.
#[cfg(target_os = "espidf")]
pub struct TickRunner {
    _timer: esp_idf_svc::timer::EspTimer<'static>,
}

#[cfg(target_os = "espidf")]
pub fn start<S, I>(mut task: TickTask<S, I>) -> anyhow::Result<TickRunner>
where
    S: Sampler + Send + 'static,
    I: Indicator + Send + 'static,
{
    use esp_idf_svc::timer::EspTaskTimerService;
    use std::time::Duration;

    let service = EspTaskTimerService::new()?;
    let mut running = true;
    let timer = service.timer(move || {
        if running {
            running = task.step().is_some();
        }
    })?;
    timer.every(Duration::from_millis(TICK_PERIOD_MS as u64))?;
    log::info!("Tick timer started ({} ms period)", TICK_PERIOD_MS);
    Ok(TickRunner { _timer: timer })
}

// ---------------------------------------------------------------------------
// Host: self-paced thread
// ---------------------------------------------------------------------------

/// Keeps the tick running; dropping it stops and joins the thread.
#[cfg(not(target_os = "espidf"))]
pub struct TickRunner {
    stop: Arc<std::sync::atomic::AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

#[cfg(not(target_os = "espidf"))]
impl Drop for TickRunner {
    fn drop(&mut self) {
        self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start<S, I>(mut task: TickTask<S, I>) -> anyhow::Result<TickRunner>
where
    S: Sampler + Send + 'static,
    I: Indicator + Send + 'static,
{
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);
    let handle = thread::Builder::new()
        .name("tick".into())
        .stack_size(STACK_TICK)
        .spawn(move || {
            let interval = Duration::from_millis(TICK_PERIOD_MS as u64);
            let mut next = Instant::now() + interval;
            while !thread_stop.load(Ordering::Relaxed) {
                if task.step().is_none() {
                    return;
                }
                // Sleep until the next tick boundary; if we are late, resync
                // instead of bursting to catch up.
                let now = Instant::now();
                if now < next {
                    thread::sleep(next - now);
                    next += interval;
                } else {
                    task.stats.record_overrun();
                    next = now + interval;
                }
            }
        })?;
    log::info!("Tick thread started ({} ms period)", TICK_PERIOD_MS);
    Ok(TickRunner {
        stop,
        handle: Some(handle),
    })
}
