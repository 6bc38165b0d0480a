//! Anchor-based warp mapping A-time → B-time.

use contracts::{AnchorPair, ContractError};
use tracing::{instrument, warn};

/// A-span below which a bracket is treated as degenerate
const MIN_SPAN: f64 = 1e-9;

/// Monotonic piecewise-linear mapping built from anchor pairs.
///
/// Invariants: `times_a.len() == times_b.len() >= 2`, both non-decreasing.
/// Immutable once built; a rebuild replaces the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpMapping {
    times_a: Vec<f64>,
    times_b: Vec<f64>,
}

impl WarpMapping {
    /// Build a mapping from matched pairs.
    ///
    /// Pairs are sorted by A-time. While folding left to right, a B-time
    /// lower than the previously emitted one is clamped up to it, so B never
    /// regresses. Non-finite pairs are skipped.
    ///
    /// # Errors
    /// `InsufficientAnchors` when fewer than 2 usable pairs remain.
    #[instrument(level = "debug", name = "warp_build", skip(pairs), fields(pairs = pairs.len()))]
    pub fn build(pairs: &[AnchorPair]) -> Result<Self, ContractError> {
        let mut sorted: Vec<(f64, f64)> = pairs
            .iter()
            .filter(|p| p.time_a.is_finite() && p.time_b.is_finite())
            .map(|p| (p.time_a, p.time_b))
            .collect();

        if sorted.len() != pairs.len() {
            warn!(
                skipped = pairs.len() - sorted.len(),
                "non-finite anchors skipped while building warp"
            );
        }

        if sorted.len() < 2 {
            return Err(ContractError::InsufficientAnchors {
                required: 2,
                actual: sorted.len(),
            });
        }

        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut times_a = Vec::with_capacity(sorted.len());
        let mut times_b = Vec::with_capacity(sorted.len());
        let mut last_b = 0.0_f64;
        for (time_a, time_b) in sorted {
            let adjusted = time_b.max(last_b);
            times_a.push(time_a);
            times_b.push(adjusted);
            last_b = adjusted;
        }

        Ok(Self { times_a, times_b })
    }

    /// Map an A-timestamp to the corresponding B-timestamp.
    ///
    /// Falls back to identity when the tables are unusable; clamps to the
    /// first/last mapped B outside the anchor range.
    pub fn map(&self, time_a: f64) -> f64 {
        let (times_a, times_b) = (&self.times_a, &self.times_b);
        if times_a.len() != times_b.len() || times_a.len() < 2 {
            return time_a;
        }

        let last = times_a.len() - 1;
        if time_a <= times_a[0] {
            return times_b[0];
        }
        if time_a >= times_a[last] {
            return times_b[last];
        }

        // Index of the last anchor with times_a[i] <= time_a; 0 < idx < last.
        let idx = times_a.partition_point(|&a| a <= time_a) - 1;

        let (a0, a1) = (times_a[idx], times_a[idx + 1]);
        let (b0, b1) = (times_b[idx], times_b[idx + 1]);
        let span = a1 - a0;
        let t = if span.abs() < MIN_SPAN {
            0.0
        } else {
            (time_a - a0) / span
        };

        b0 + t * (b1 - b0)
    }

    /// Anchor A-times, ascending
    pub fn times_a(&self) -> &[f64] {
        &self.times_a
    }

    /// Anchor B-times, non-decreasing
    pub fn times_b(&self) -> &[f64] {
        &self.times_b
    }

    /// Number of anchor points
    pub fn len(&self) -> usize {
        self.times_a.len()
    }

    /// Always false for a built mapping
    pub fn is_empty(&self) -> bool {
        self.times_a.is_empty()
    }

    /// Pairs of the mapping in persisted order
    pub fn to_pairs(&self) -> Vec<AnchorPair> {
        self.times_a
            .iter()
            .zip(&self.times_b)
            .map(|(&a, &b)| AnchorPair::new(a, b))
            .collect()
    }
}

/// Map through an optional mapping; identity when none is installed.
#[inline]
pub fn map_a_to_b(mapping: Option<&WarpMapping>, time_a: f64) -> f64 {
    mapping.map_or(time_a, |m| m.map(time_a))
}

/// How much faster or slower B runs than A between two anchors.
///
/// Returns the B-span per A-span; the A-span is guarded against zero.
pub fn delta_rate(a_start: f64, b_start: f64, a_end: f64, b_end: f64) -> f64 {
    let span_a = a_end - a_start;
    let span_b = b_end - b_start;
    let safe_a = if span_a.abs() < MIN_SPAN { MIN_SPAN } else { span_a };
    span_b / safe_a
}
