//! Follower correction planning.
//!
//! `raw_delta` is `mapped_target - follower`: positive means the follower
//! is behind where the mapping says it should be.
//!
//! - Small drift (`|raw| < soft_threshold`): proportional rate trim,
//!   `rate = 1 + clamp(kp * raw, -max_adj, +max_adj)`. A follower that is
//!   behind speeds up, one that is ahead slows down.
//! - Large drift: fixed seek step toward the target, rate back to 1.

use contracts::{Correction, SyncControllerConfig};

/// Rate-trim / seek decision for one tick
#[derive(Debug, Clone, Copy)]
pub struct CorrectionPlanner {
    soft_threshold: f64,
    kp: f64,
    max_rate_adjust: f64,
    seek_step: f64,
}

impl CorrectionPlanner {
    pub fn new(config: &SyncControllerConfig) -> Self {
        Self {
            soft_threshold: config.soft_threshold_s.abs(),
            kp: config.kp,
            max_rate_adjust: config.max_rate_adjust.abs(),
            seek_step: config.seek_step_s.abs(),
        }
    }

    /// Plan the follower correction.
    ///
    /// `active` is false when either stream is paused or the controller is
    /// in alignment mode; the follower then runs at rate 1.
    pub fn plan(&self, raw_delta: f64, active: bool) -> Correction {
        if !active || !raw_delta.is_finite() || raw_delta == 0.0 {
            return Correction::None;
        }

        if raw_delta.abs() < self.soft_threshold {
            let adjust = (self.kp * raw_delta).clamp(-self.max_rate_adjust, self.max_rate_adjust);
            Correction::RateTrim { rate: 1.0 + adjust }
        } else {
            Correction::Seek {
                step: self.seek_step.copysign(raw_delta),
            }
        }
    }

    /// Rate the follower runs at after `correction`
    pub fn follower_rate(correction: &Correction) -> f64 {
        match correction {
            Correction::RateTrim { rate } => *rate,
            Correction::None | Correction::Seek { .. } => 1.0,
        }
    }
}

impl Default for CorrectionPlanner {
    fn default() -> Self {
        Self::new(&SyncControllerConfig::default())
    }
}
