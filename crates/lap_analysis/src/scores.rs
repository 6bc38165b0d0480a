//! Consistency and lead-share scores.

use contracts::DeltaSample;

use crate::samples::{normalize_samples, slope_segments};

/// Share of slopes kept after discarding the steepest decile
const CONSISTENCY_TRIM: f64 = 0.9;
/// Score lost per second-of-delta per lap of mean absolute slope
const CONSISTENCY_GAIN: f64 = 12.0;
/// Fewer usable samples than this is "insufficient data"
const MIN_CONSISTENCY_SAMPLES: usize = 3;

/// Smoothness of the delta trace in `[0, 100]`.
///
/// Mean of the lowest 90% absolute slopes, `100 - 12 * mean`, clamped and
/// rounded. Fewer than 3 usable samples score 0, not "perfect".
pub fn consistency_score(samples: &[DeltaSample]) -> f64 {
    let normalized = normalize_samples(samples);
    if normalized.len() < MIN_CONSISTENCY_SAMPLES {
        return 0.0;
    }

    let mut slopes: Vec<f64> = slope_segments(&normalized)
        .into_iter()
        .map(|(_, _, slope)| slope.abs())
        .collect();
    if slopes.is_empty() {
        return 0.0;
    }

    slopes.sort_by(f64::total_cmp);
    let cutoff = (slopes.len() as f64 * CONSISTENCY_TRIM).floor() as usize;
    let trimmed = &slopes[..cutoff.max(1)];
    let mean = trimmed.iter().sum::<f64>() / trimmed.len() as f64;

    (100.0 - CONSISTENCY_GAIN * mean).clamp(0.0, 100.0).round()
}

/// Percentage of samples where A is ahead (`delta > 0`), rounded.
///
/// Empty input gives 0.
pub fn lead_share_a(samples: &[DeltaSample]) -> f64 {
    let normalized = normalize_samples(samples);
    if normalized.is_empty() {
        return 0.0;
    }
    let ahead = normalized.iter().filter(|s| s.delta > 0.0).count();
    (ahead as f64 / normalized.len() as f64 * 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(f64, f64)]) -> Vec<DeltaSample> {
        points.iter().map(|&(p, d)| DeltaSample::new(p, d)).collect()
    }

    #[test]
    fn test_consistency_needs_three_samples() {
        assert_eq!(consistency_score(&[]), 0.0);
        assert_eq!(consistency_score(&samples(&[(0.0, 0.0), (1.0, 0.0)])), 0.0);
    }

    #[test]
    fn test_flat_trace_is_perfect() {
        let flat = samples(&[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0)]);
        assert_eq!(consistency_score(&flat), 100.0);
    }

    #[test]
    fn test_steady_slope_lowers_score() {
        // |slope| = 2 s per lap everywhere -> 100 - 24
        let ramp = samples(&[(0.0, 0.0), (0.25, 0.5), (0.5, 1.0), (0.75, 1.5), (1.0, 2.0)]);
        assert_eq!(consistency_score(&ramp), 76.0);
    }

    #[test]
    fn test_outlier_decile_is_trimmed() {
        let mut points: Vec<(f64, f64)> = (0..=20).map(|i| (i as f64 / 20.0, 0.0)).collect();
        // one violent jump in the last segment
        points[20].1 = 50.0;
        assert_eq!(consistency_score(&samples(&points)), 100.0);
    }

    #[test]
    fn test_consistency_stays_in_range() {
        let wild = samples(&[(0.0, 0.0), (0.01, 40.0), (0.02, -40.0), (0.03, 40.0)]);
        let score = consistency_score(&wild);
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_no_advancing_progress_scores_zero() {
        let stuck = samples(&[(0.5, 0.0), (0.5, 1.0), (0.5, 2.0)]);
        assert_eq!(consistency_score(&stuck), 0.0);
    }

    #[test]
    fn test_lead_share() {
        assert_eq!(lead_share_a(&[]), 0.0);
        let mixed = samples(&[(0.0, 0.1), (0.25, -0.2), (0.5, 0.3), (0.75, 0.0)]);
        assert_eq!(lead_share_a(&mixed), 50.0);
        let third = samples(&[(0.0, 1.0), (0.5, -1.0), (1.0, -1.0)]);
        assert_eq!(lead_share_a(&third), 33.0);
    }
}
