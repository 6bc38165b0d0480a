//! DeltaSample / TickOutput - SyncController output
//!
//! The controller shares its per-tick state only through `TickOutput`
//! values; every consumer (sample store, HUD, metrics) owns its own copy.

use serde::{Deserialize, Serialize};

/// Observed delta at one lap-progress point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaSample {
    /// Lap progress of the reference stream, `[0, 1]`
    pub p: f64,

    /// Mapped reference time minus follower time (seconds)
    pub delta: f64,
}

impl DeltaSample {
    #[inline]
    pub fn new(p: f64, delta: f64) -> Self {
        Self { p, delta }
    }
}

/// Controller operating mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Both streams play independently, soft correction active
    #[default]
    FreeRun,
    /// User is pairing anchors, correction suspended
    Alignment,
}

/// Correction applied to the follower during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    /// Follower left at rate 1 (paused, aligning, or no drift)
    #[default]
    None,
    /// Proportional playback-rate trim
    RateTrim { rate: f64 },
    /// Discrete position step (seconds, signed)
    Seek { step: f64 },
}

impl Correction {
    /// Short label used for metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RateTrim { .. } => "rate_trim",
            Self::Seek { .. } => "seek",
        }
    }
}

/// One controller tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickOutput {
    /// Exponentially smoothed delta reported as the live delta
    pub smoothed_delta: f64,

    /// Reference progress `[0, 1]` (0 when duration unknown)
    pub progress: f64,

    /// Unsmoothed delta of this tick
    pub raw_delta: f64,

    /// Correction applied to the follower
    pub correction: Correction,

    /// Incremented whenever either stream changes identity
    pub source_epoch: u64,
}

impl TickOutput {
    /// Sample view of this tick, as recorded by the sample store
    #[inline]
    pub fn sample(&self) -> DeltaSample {
        DeltaSample::new(self.progress, self.raw_delta)
    }
}
