// Pulsebeat - Window Aggregator
//
// Counts beat edges over a fixed WINDOW_MS window and converts the count to a
// per-minute rate when the window closes.

use crate::config::*;
use crate::events::{BeatEdge, Bpm, BpmReady};

#[derive(Debug, Clone, Default)]
pub struct WindowAggregator {
    beat_count: u32,
    window_ms: u32,
    last_bpm: Bpm,
}

impl WindowAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick. Returns the window result on the tick that closes it.
    pub fn on_tick(&mut self, edge: Option<BeatEdge>) -> Option<BpmReady> {
        if edge.is_some() {
            self.beat_count += 1;
        }
        self.window_ms += TICK_PERIOD_MS;

        if self.window_ms < WINDOW_MS {
            return None;
        }

        let bpm = (self.beat_count * BPM_SCALE).min(Bpm::MAX as u32) as Bpm;
        self.last_bpm = bpm;
        self.window_ms = 0;
        self.beat_count = 0;
        Some(BpmReady(bpm))
    }

    /// Beats counted so far in the open window.
    pub fn beat_count(&self) -> u32 {
        self.beat_count
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }

    /// Result of the most recently closed window (0 before the first).
    pub fn last_bpm(&self) -> Bpm {
        self.last_bpm
    }
}
