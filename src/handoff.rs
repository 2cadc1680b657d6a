// Pulsebeat - Measurement Hand-off
//
// Single-writer (tick task) / single-reader (publish task) slot for the latest
// BPM and its ready flag.  Both live in one atomic word so a reader that sees
// the flag always sees the value written with it.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use crate::detector::BeatDetector;
use crate::events::Bpm;

const READY: u32 = 1 << 31;
const VALUE_MASK: u32 = Bpm::MAX as u32;

#[derive(Debug, Default)]
pub struct MeasurementSlot {
    word: AtomicU32,
}

impl MeasurementSlot {
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(0),
        }
    }

    /// Store a new window result and mark it ready. Never blocks.
    pub fn publish(&self, bpm: Bpm) {
        self.word.store(READY | bpm as u32, Ordering::Release);
    }

    /// Pending measurement, without consuming it.
    pub fn peek(&self) -> Option<Bpm> {
        let w = self.word.load(Ordering::Acquire);
        (w & READY != 0).then_some((w & VALUE_MASK) as Bpm)
    }

    /// Consume the pending measurement. Returns `Some` at most once per
    /// `publish`.
    pub fn take(&self) -> Option<Bpm> {
        let w = self.word.fetch_and(!READY, Ordering::AcqRel);
        (w & READY != 0).then_some((w & VALUE_MASK) as Bpm)
    }

    /// Last published value, ready or not.
    pub fn current(&self) -> Bpm {
        (self.word.load(Ordering::Acquire) & VALUE_MASK) as Bpm
    }

    pub fn is_ready(&self) -> bool {
        self.word.load(Ordering::Acquire) & READY != 0
    }
}

// ---------------------------------------------------------------------------
// Detector snapshot for logging outside the tick task
// ---------------------------------------------------------------------------

/// Written by the tick task at window closure and on overruns, read by the
/// publish task for its log lines.  Fields are independent; no ordering
/// between them is implied.
#[derive(Debug, Default)]
pub struct TickStats {
    threshold: AtomicI32,
    peak: AtomicI32,
    trough: AtomicI32,
    envelope_resets: AtomicU32,
    overruns: AtomicU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorSnapshot {
    pub threshold: i32,
    pub peak: i32,
    pub trough: i32,
    pub envelope_resets: u32,
}

impl TickStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_detector(&self, det: &BeatDetector) {
        self.threshold.store(det.threshold(), Ordering::Relaxed);
        self.peak.store(det.peak(), Ordering::Relaxed);
        self.trough.store(det.trough(), Ordering::Relaxed);
        self.envelope_resets.store(det.envelope_resets(), Ordering::Relaxed);
    }

    pub fn detector(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            threshold: self.threshold.load(Ordering::Relaxed),
            peak: self.peak.load(Ordering::Relaxed),
            trough: self.trough.load(Ordering::Relaxed),
            envelope_resets: self.envelope_resets.load(Ordering::Relaxed),
        }
    }

    pub fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Overruns since the previous call.
    pub fn take_overruns(&self) -> u32 {
        self.overruns.swap(0, Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Wake signal from the tick task to the publish task
// ---------------------------------------------------------------------------

/// Create the wake channel. Capacity 1: one pending wake is enough because
/// the publisher always reads the newest value from the slot.
pub fn wake_channel() -> (WakeSignal, Receiver<()>) {
    let (tx, rx) = mpsc::sync_channel(1);
    (WakeSignal { tx }, rx)
}

#[derive(Debug, Clone)]
pub struct WakeSignal {
    tx: SyncSender<()>,
}

impl WakeSignal {
    /// Signal the publisher without blocking. Returns `false` once the
    /// receiving side has gone away.
    pub fn wake(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        }
    }
}
