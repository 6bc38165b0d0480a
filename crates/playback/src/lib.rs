//! # Playback
//!
//! Simulated time-addressable media for environments without a real
//! decoder (tests, CLI demo).
//!
//! - `SimulatedMedia`: a `MediaSource` driven by the tokio clock, with
//!   controllable readiness, buffering and stalls
//! - `FrameClock`: a simulated decoder emitting frame callbacks at a fixed
//!   frame rate
//!
//! Both use `tokio::time`, so tests can run them on paused time.

mod clock;
mod media;

pub use clock::FrameClock;
pub use media::{ReadinessHandle, SimulatedMedia, SimulatedMediaConfig};
