//! LapSummary / Segment - Lap Analysis output

use serde::{Deserialize, Serialize};

/// Which theoretical-best integration produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BestLapMethod {
    /// Anchor check-points (exact)
    Anchors,
    /// Delta-sample slope density (approximate)
    Density,
}

/// On-demand lap comparison statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapSummary {
    /// Lap time A (seconds)
    pub lap_a: f64,

    /// Lap time B (seconds)
    pub lap_b: f64,

    /// Faster of the two laps
    pub best_lap: f64,

    /// `lap_b - lap_a`
    pub final_gap: f64,

    /// Hypothetical lap taking the faster pace in every micro-segment
    pub theoretical_best: f64,

    /// `best_lap - theoretical_best`, never negative
    pub theoretical_saving: f64,

    /// Smoothness of the delta trace, `[0, 100]`
    pub consistency_score: f64,

    /// Share of the lap with A ahead, `[0, 100]`
    pub lead_share_a: f64,

    /// Integration used for `theoretical_best`
    pub method: BestLapMethod,
}

/// Derived span between two consecutive anchors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the anchor table
    pub index: usize,

    /// Span on timeline A (seconds, ≥ 0)
    pub a_span: f64,

    /// Span on timeline B (seconds, ≥ 0)
    pub b_span: f64,

    /// `b_span - a_span`; negative = B faster (gain), positive = B slower (loss)
    pub seg_delta: f64,

    /// Cumulative A time at segment end
    pub cum_a: f64,

    /// Cumulative B time at segment end
    pub cum_b: f64,

    /// Cumulative delta at segment end
    pub cum_delta: f64,
}
