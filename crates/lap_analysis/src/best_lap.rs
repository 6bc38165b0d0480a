//! Theoretical best lap.
//!
//! Two integration strategies, selected by data availability:
//! - `AnchorIntegration`: anchors are exact check-points; take the faster
//!   span of every segment.
//! - `DensityIntegration`: approximate local pace from the slope of the
//!   delta trace, binned and bounded.

use contracts::{AnchorPair, BestLapMethod, DeltaSample};
use tracing::trace;

use crate::samples::{normalize_samples, slope_segments};

/// Tolerance for synthetic lap start/end anchors
const ENDPOINT_EPS: f64 = 1e-3;
/// Upper bound of a bin's alternative pace, as a multiple of the reference lap
const MAX_PACE_FACTOR: f64 = 3.0;

/// Inputs shared by both strategies
#[derive(Debug, Clone, Copy)]
pub struct BestLapInput<'a> {
    pub lap_a: f64,
    pub lap_b: f64,
    pub anchors: &'a [AnchorPair],
    pub samples: &'a [DeltaSample],
}

/// Theoretical best lap integration
pub trait BestLapStrategy {
    /// Which method this strategy implements
    fn method(&self) -> BestLapMethod;

    /// Theoretical best lap time (seconds)
    fn compute(&self, input: &BestLapInput<'_>) -> f64;
}

/// Sum of the faster span between consecutive anchors
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorIntegration;

impl BestLapStrategy for AnchorIntegration {
    fn method(&self) -> BestLapMethod {
        BestLapMethod::Anchors
    }

    fn compute(&self, input: &BestLapInput<'_>) -> f64 {
        let lap_a = finite_or_zero(input.lap_a);
        let lap_b = finite_or_zero(input.lap_b);
        if input.anchors.len() < 2 {
            return lap_a.min(lap_b);
        }

        let mut points: Vec<(f64, f64)> = input
            .anchors
            .iter()
            .map(|p| (finite_or_zero(p.time_a), finite_or_zero(p.time_b)))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        if points[0].0 > ENDPOINT_EPS {
            points.insert(0, (0.0, 0.0));
        }
        let (last_a, _) = points[points.len() - 1];
        if (last_a - lap_a).abs() > ENDPOINT_EPS {
            points.push((lap_a, lap_b));
        }

        points
            .windows(2)
            .filter_map(|w| {
                let span_a = w[1].0 - w[0].0;
                let span_b = w[1].1 - w[0].1;
                (span_a >= 0.0 && span_b >= 0.0).then(|| span_a.min(span_b))
            })
            .sum()
    }
}

/// Binned slope-density integration of the delta trace
#[derive(Debug, Clone, Copy)]
pub struct DensityIntegration {
    /// Number of equal-width progress bins
    pub bins: usize,
}

impl Default for DensityIntegration {
    fn default() -> Self {
        Self { bins: 60 }
    }
}

impl DensityIntegration {
    pub fn new(bins: usize) -> Self {
        Self { bins: bins.max(1) }
    }

    /// Integrate `min(reference, reference + slope)` over the bins.
    fn integrate(&self, segments: &[(f64, f64, f64)], reference_lap: f64) -> f64 {
        let bins = self.bins.max(1);
        let step = 1.0 / bins as f64;

        let hybrid: f64 = (0..bins)
            .map(|i| {
                let bin_start = i as f64 * step;
                let bin_end = (i + 1) as f64 * step;

                let (slope_sum, weight) = segments.iter().fold((0.0, 0.0), |(sum, w), &(p0, p1, slope)| {
                    let overlap = bin_end.min(p1) - bin_start.max(p0);
                    if overlap > 0.0 {
                        (sum + slope * overlap, w + overlap)
                    } else {
                        (sum, w)
                    }
                });
                let mean_slope = if weight > 0.0 { slope_sum / weight } else { 0.0 };

                let alternative = (reference_lap + mean_slope).clamp(0.0, reference_lap * MAX_PACE_FACTOR);
                reference_lap.min(alternative) * step
            })
            .sum();

        hybrid.clamp(0.0, reference_lap)
    }
}

impl BestLapStrategy for DensityIntegration {
    fn method(&self) -> BestLapMethod {
        BestLapMethod::Density
    }

    fn compute(&self, input: &BestLapInput<'_>) -> f64 {
        let lap_a = finite_or_zero(input.lap_a);
        let lap_b = finite_or_zero(input.lap_b);
        if lap_a <= 0.0 && lap_b <= 0.0 {
            return 0.0;
        }

        let normalized = normalize_samples(input.samples);
        if normalized.len() < 2 {
            return lap_a.min(lap_b);
        }

        // A is not slower: integrate in A-space. Ties go to A.
        if lap_a <= lap_b {
            let segments = slope_segments(&normalized);
            if segments.is_empty() {
                return lap_a.min(lap_b);
            }
            trace!(frame = "a", segments = segments.len(), "density integration");
            return self.integrate(&segments, lap_a);
        }

        // Reframe the trace relative to B.
        let mut transformed: Vec<DeltaSample> = normalized
            .iter()
            .map(|s| {
                let time_a = s.p * lap_a;
                let time_b = time_a + s.delta;
                let progress_b = if lap_b > 0.0 {
                    (time_b / lap_b).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                DeltaSample::new(progress_b, -s.delta)
            })
            .collect();
        transformed.sort_by(|a, b| a.p.total_cmp(&b.p));

        let segments = slope_segments(&transformed);
        if segments.is_empty() {
            return lap_a.min(lap_b);
        }
        trace!(frame = "b", segments = segments.len(), "density integration");
        self.integrate(&segments, lap_b)
    }
}

/// Preferred strategy: anchors when at least 2 pairs exist, else density.
pub fn select_strategy(anchor_count: usize, bins: usize) -> Box<dyn BestLapStrategy> {
    if anchor_count >= 2 {
        Box::new(AnchorIntegration)
    } else {
        Box::new(DensityIntegration::new(bins))
    }
}

/// Theoretical best lap with the preferred strategy.
pub fn theoretical_best_lap(input: &BestLapInput<'_>, bins: usize) -> (f64, BestLapMethod) {
    let strategy = select_strategy(input.anchors.len(), bins);
    (strategy.compute(input), strategy.method())
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
