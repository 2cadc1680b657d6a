// Pulsebeat - Publish Task
//
// Sleeps until the tick task signals a closed window or the idle interval
// elapses, then makes one publish attempt.  All per-window logging happens
// here so the tick path stays free of console I/O.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;

use crate::events::PublishEvent;
use crate::handoff::{MeasurementSlot, TickStats};
use crate::publisher::{Publisher, Transport};

/// Runs until the tick task drops its wake signal; hands the publisher back
/// so the caller can inspect or reuse the transport.
pub fn publish_task<T: Transport>(
    mut publisher: Publisher<T>,
    slot: Arc<MeasurementSlot>,
    stats: Arc<TickStats>,
    wake_rx: Receiver<()>,
) -> Publisher<T> {
    log::info!("Publish task started");

    let idle = publisher.config().idle_interval;
    loop {
        match wake_rx.recv_timeout(idle) {
            Ok(()) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Tick task gone, exiting publish task");
                return publisher;
            }
        }

        let overruns = stats.take_overruns();
        if overruns > 0 {
            log::warn!("{} tick overruns since the last poll", overruns);
        }

        let event = publisher.poll(&slot);
        match event {
            PublishEvent::Measurement(bpm) => {
                let det = stats.detector();
                log::info!(
                    "Window closed: {} bpm (threshold {}, envelope {}..{}, {} envelope resets)",
                    bpm,
                    det.threshold,
                    det.trough,
                    det.peak,
                    det.envelope_resets
                );
            }
            PublishEvent::PeerAbsent if slot.is_ready() => {
                log::info!("Window closed: {} bpm, waiting for a peer", slot.current());
            }
            _ => log::debug!("Publish: {:?}", event),
        }
    }
}
