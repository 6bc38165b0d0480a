//! Delta sample normalization shared by all statistics.

use contracts::DeltaSample;

/// Drop non-finite samples, clamp progress to `[0, 1]`, stable-sort by progress.
pub fn normalize_samples(samples: &[DeltaSample]) -> Vec<DeltaSample> {
    let mut normalized: Vec<DeltaSample> = samples
        .iter()
        .filter(|s| s.p.is_finite() && s.delta.is_finite())
        .map(|s| DeltaSample::new(s.p.clamp(0.0, 1.0), s.delta))
        .collect();
    normalized.sort_by(|a, b| a.p.total_cmp(&b.p));
    normalized
}

/// Slope of `delta` over progress between consecutive samples where
/// progress strictly advances, as `(p0, p1, slope)`.
pub(crate) fn slope_segments(samples: &[DeltaSample]) -> Vec<(f64, f64, f64)> {
    samples
        .windows(2)
        .filter_map(|pair| {
            let span = pair[1].p - pair[0].p;
            (span > 0.0).then(|| (pair[0].p, pair[1].p, (pair[1].delta - pair[0].delta) / span))
        })
        .collect()
}
