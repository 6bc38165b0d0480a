//! Segment table between consecutive anchors.
//!
//! Segments are derived on demand from the current anchor set and never
//! stored.

use contracts::{AnchorPair, Segment};

const EPS: f64 = 1e-9;

/// Anchors split into aligned A/B arrays spanning the full lap
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnchors {
    pub times_a: Vec<f64>,
    pub times_b: Vec<f64>,
}

/// Largest gains and losses of B relative to A
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedSegments {
    /// `seg_delta < 0`, B faster
    pub gains: Vec<Segment>,
    /// `seg_delta > 0`, B slower
    pub losses: Vec<Segment>,
}

/// Clean anchors into a lap-spanning table.
///
/// Drops invalid points and points whose A-time does not advance, then
/// guarantees a `(0, 0)` start and a `(lap_a, lap_b)` end when lap times
/// are known. Returns `None` when fewer than 2 points remain.
pub fn normalize_anchors(
    pairs: &[AnchorPair],
    lap_a: Option<f64>,
    lap_b: Option<f64>,
) -> Option<NormalizedAnchors> {
    let mut points: Vec<(f64, f64)> = pairs
        .iter()
        .filter(|p| p.is_valid())
        .map(|p| (p.time_a, p.time_b))
        .collect();
    if points.is_empty() {
        return None;
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points.dedup_by(|next, kept| next.0 <= kept.0 + EPS);

    if points[0].0 > EPS || points[0].1 > EPS {
        points.insert(0, (0.0, 0.0));
    }

    let lap_a = lap_a.filter(|v| v.is_finite());
    let lap_b = lap_b.filter(|v| v.is_finite());
    let (last_a, last_b) = points[points.len() - 1];
    let need_end_a = lap_a.is_some_and(|lap| (last_a - lap).abs() > EPS);
    let need_end_b = lap_b.is_some_and(|lap| (last_b - lap).abs() > EPS);
    if need_end_a || need_end_b {
        points.push((lap_a.unwrap_or(last_a), lap_b.unwrap_or(last_b)));
    }

    if points.len() < 2 {
        return None;
    }

    let (times_a, times_b) = points.into_iter().unzip();
    Some(NormalizedAnchors { times_a, times_b })
}

/// Per-segment spans and cumulative totals.
///
/// Negative spans (tiny jitter) are clamped to zero.
pub fn build_segments(anchors: &NormalizedAnchors) -> Vec<Segment> {
    let n = anchors.times_a.len().min(anchors.times_b.len());
    if n < 2 {
        return Vec::new();
    }

    let (mut cum_a, mut cum_b, mut cum_delta) = (0.0, 0.0, 0.0);
    (0..n - 1)
        .map(|index| {
            let a_span = (anchors.times_a[index + 1] - anchors.times_a[index]).max(0.0);
            let b_span = (anchors.times_b[index + 1] - anchors.times_b[index]).max(0.0);
            let seg_delta = b_span - a_span;
            cum_a += a_span;
            cum_b += b_span;
            cum_delta += seg_delta;
            Segment {
                index,
                a_span,
                b_span,
                seg_delta,
                cum_a,
                cum_b,
                cum_delta,
            }
        })
        .collect()
}

/// Top `top` gains and losses by absolute segment delta.
pub fn rank_segments(segments: &[Segment], top: usize) -> RankedSegments {
    let by_abs_desc = |x: &Segment, y: &Segment| y.seg_delta.abs().total_cmp(&x.seg_delta.abs());

    let mut gains: Vec<Segment> = segments.iter().copied().filter(|s| s.seg_delta < 0.0).collect();
    gains.sort_by(by_abs_desc);
    gains.truncate(top);

    let mut losses: Vec<Segment> = segments.iter().copied().filter(|s| s.seg_delta > 0.0).collect();
    losses.sort_by(by_abs_desc);
    losses.truncate(top);

    RankedSegments { gains, losses }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(points: &[(f64, f64)]) -> Vec<AnchorPair> {
        points.iter().copied().map(AnchorPair::from).collect()
    }

    #[test]
    fn test_normalize_adds_start_and_end() {
        let anchors = normalize_anchors(&pairs(&[(10.0, 9.0), (20.0, 21.0)]), Some(30.0), Some(28.0)).unwrap();
        assert_eq!(anchors.times_a, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(anchors.times_b, vec![0.0, 9.0, 21.0, 28.0]);
    }

    #[test]
    fn test_normalize_drops_duplicates_and_invalid() {
        let anchors = normalize_anchors(
            &pairs(&[(0.0, 0.0), (10.0, 9.0), (10.0, 11.0), (f64::NAN, 3.0), (30.0, 28.0)]),
            Some(30.0),
            Some(28.0),
        )
        .unwrap();
        assert_eq!(anchors.times_a, vec![0.0, 10.0, 30.0]);
        assert_eq!(anchors.times_b, vec![0.0, 9.0, 28.0]);
    }

    #[test]
    fn test_normalize_empty_is_none() {
        assert!(normalize_anchors(&[], Some(30.0), Some(28.0)).is_none());
        // only the origin, no lap times to close the table
        assert!(normalize_anchors(&pairs(&[(0.0, 0.0)]), None, None).is_none());
    }

    #[test]
    fn test_segments_accumulate() {
        let anchors = normalize_anchors(&pairs(&[(10.0, 9.0), (20.0, 21.0)]), Some(30.0), Some(28.0)).unwrap();
        let segments = build_segments(&anchors);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].seg_delta, -1.0);
        assert_eq!(segments[1].seg_delta, 2.0);
        assert_eq!(segments[2].seg_delta, -3.0);
        let last = segments.last().unwrap();
        assert_eq!(last.cum_a, 30.0);
        assert_eq!(last.cum_b, 28.0);
        assert_eq!(last.cum_delta, -2.0);
    }

    #[test]
    fn test_rank_segments() {
        let anchors = normalize_anchors(&pairs(&[(10.0, 9.0), (20.0, 21.0)]), Some(30.0), Some(28.0)).unwrap();
        let ranked = rank_segments(&build_segments(&anchors), 1);
        assert_eq!(ranked.gains.len(), 1);
        assert_eq!(ranked.gains[0].index, 2);
        assert_eq!(ranked.losses.len(), 1);
        assert_eq!(ranked.losses[0].index, 1);
    }
}
