// Pulsebeat - Pipeline Events & Data Types

/// One scaled analog reading, 0..=255.
pub type RawSample = u8;

/// Beats per minute as announced to the peer.
///
/// Deliberately wider than a single byte: the largest value a window can
/// produce (a beat every other tick) is 15 000, so a noisy signal can read
/// above 255 and must not wrap.
pub type Bpm = u16;

// ---------------------------------------------------------------------------
// Detector / aggregator outputs
// ---------------------------------------------------------------------------

/// Rising threshold crossing: one heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatEdge;

/// Emitted when an aggregation window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpmReady(pub Bpm);

/// Everything one tick of the pipeline produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutput {
    pub edge: Option<BeatEdge>,
    pub ready: Option<BpmReady>,
    /// Latch state after this tick; drives the beat indicator.
    pub latched: bool,
}

// ---------------------------------------------------------------------------
// Publisher outcomes
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishEvent {
    /// A fresh window result was taken and forwarded.
    Measurement(Bpm),
    /// Nothing pending; the idle value was forwarded instead.
    Idle(Bpm),
    /// No peer connected; nothing sent, pending measurement kept.
    PeerAbsent,
}

impl PublishEvent {
    /// Value that went out to the peer, if any.
    pub fn sent_value(&self) -> Option<Bpm> {
        match self {
            Self::Measurement(v) | Self::Idle(v) => Some(*v),
            Self::PeerAbsent => None,
        }
    }
}
