//! Sync controller and analysis tuning contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Soft-sync controller tuning
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SyncControllerConfig {
    /// Drift (seconds) below which the follower rate is trimmed instead of seeking
    #[validate(range(min = 0.001, max = 10.0))]
    pub soft_threshold_s: f64,

    /// Proportional gain of the rate trim (rate change per second of drift)
    #[validate(range(min = 0.0, max = 10.0))]
    pub kp: f64,

    /// Maximum absolute rate adjustment around 1.0
    #[validate(range(min = 0.0, max = 0.5))]
    pub max_rate_adjust: f64,

    /// Fixed seek step (seconds) applied when drift exceeds the soft threshold
    #[validate(range(min = 0.001, max = 10.0))]
    pub seek_step_s: f64,

    /// Exponential smoothing factor of the live delta
    #[validate(range(min = 0.0, max = 1.0))]
    pub smoothing_alpha: f64,
}

impl Default for SyncControllerConfig {
    fn default() -> Self {
        Self {
            soft_threshold_s: 0.35,
            kp: 0.5,
            max_rate_adjust: 0.08,
            seek_step_s: 0.1,
            smoothing_alpha: 0.3,
        }
    }
}

/// Tick scheduling
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TickConfig {
    /// Fallback timer rate when no frame callback is available (Hz)
    #[validate(range(min = 1.0, max = 1000.0))]
    pub timer_hz: f64,

    /// Maximum rate of published outputs (Hz)
    #[validate(range(min = 0.1, max = 1000.0))]
    pub publish_hz: f64,

    /// Capacity of the output channel
    #[validate(range(min = 1))]
    pub channel_capacity: usize,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            timer_hz: 60.0,
            publish_hz: 15.0,
            channel_capacity: 256,
        }
    }
}

/// Lap analysis tuning
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of equal-width progress bins of the density integration
    #[validate(range(min = 1, max = 10000))]
    pub density_bins: usize,

    /// Minimum matched points for an interactive mapping commit
    #[validate(range(min = 2))]
    pub min_commit_points: usize,

    /// Number of ranked gain/loss segments reported
    pub top_segments: usize,

    /// Rolling window of the gain/loss rate (milliseconds)
    #[validate(range(min = 1.0, max = 60_000.0))]
    pub rate_window_ms: f64,

    /// Smoothing factor of the gain/loss rate
    #[validate(range(min = 0.0, max = 1.0))]
    pub rate_smoothing: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            density_bins: 60,
            min_commit_points: 6,
            top_segments: 3,
            rate_window_ms: 900.0,
            rate_smoothing: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SyncControllerConfig::default().validate().is_ok());
        assert!(TickConfig::default().validate().is_ok());
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_alpha_rejected() {
        let config = SyncControllerConfig {
            smoothing_alpha: 1.5,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("smoothing_alpha"));
    }
}
