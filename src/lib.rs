// Pulsebeat - PPG heart-rate monitor
//
// Samples a pulse sensor every 2 ms, detects beats against an adaptive
// threshold and reports beats per minute over 15-second windows.

pub mod aggregator;
pub mod config;
pub mod detector;
pub mod drivers;
pub mod events;
pub mod handoff;
pub mod pipeline;
pub mod publisher;
pub mod sampler;
pub mod tasks;
