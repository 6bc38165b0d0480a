//! AnchorPair - matched points between the two timelines
//!
//! Anchors are the only user input of the warp mapping. At the collaborator
//! boundary they may arrive in several shapes (`AnchorInput`); they are
//! normalized to `Vec<AnchorPair>` before anything else sees them.

use serde::{Deserialize, Serialize};

/// One matched point: stream A at `time_a` shows the same physical location
/// as stream B at `time_b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    /// Reference stream time (seconds)
    #[serde(rename = "tA", alias = "time_a")]
    pub time_a: f64,

    /// Follower stream time (seconds)
    #[serde(rename = "tB", alias = "time_b")]
    pub time_b: f64,

    /// Lap start/end pairs the user cannot delete
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl AnchorPair {
    /// Create an unlocked pair
    #[inline]
    pub fn new(time_a: f64, time_b: f64) -> Self {
        Self {
            time_a,
            time_b,
            locked: false,
        }
    }

    /// Create a locked pair (lap start / lap end)
    #[inline]
    pub fn locked(time_a: f64, time_b: f64) -> Self {
        Self {
            time_a,
            time_b,
            locked: true,
        }
    }

    /// Both times finite and non-negative
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.time_a.is_finite()
            && self.time_b.is_finite()
            && self.time_a >= 0.0
            && self.time_b >= 0.0
    }
}

impl From<(f64, f64)> for AnchorPair {
    fn from((time_a, time_b): (f64, f64)) -> Self {
        Self::new(time_a, time_b)
    }
}

/// Anchor list as it arrives from imported state or interactive pairing.
///
/// Accepted shapes:
/// - `[{ "tA": 1.0, "tB": 1.2 }, ...]`
/// - `[[1.0, 1.2], ...]`
/// - `[1.0, 1.2, 2.0, 2.3, ...]` (flat, alternating A/B)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnchorInput {
    /// List of pair objects
    Pairs(Vec<AnchorPair>),
    /// List of `[tA, tB]` tuples
    Tuples(Vec<[f64; 2]>),
    /// Flat alternating list
    Flat(Vec<f64>),
}

impl Default for AnchorInput {
    fn default() -> Self {
        Self::Pairs(Vec::new())
    }
}

impl AnchorInput {
    /// Normalize to canonical pairs.
    ///
    /// Entries with non-finite or negative times are dropped. A flat list of
    /// odd length ignores its trailing value. Order is preserved.
    pub fn into_pairs(self) -> Vec<AnchorPair> {
        self.into_raw().into_iter().filter(AnchorPair::is_valid).collect()
    }

    /// Canonical pairs including invalid entries, for diagnostics
    pub fn raw_pairs(&self) -> Vec<AnchorPair> {
        self.clone().into_raw()
    }

    fn into_raw(self) -> Vec<AnchorPair> {
        match self {
            Self::Pairs(pairs) => pairs,
            Self::Tuples(tuples) => tuples.into_iter().map(|[a, b]| AnchorPair::new(a, b)).collect(),
            Self::Flat(values) => values
                .chunks_exact(2)
                .map(|chunk| AnchorPair::new(chunk[0], chunk[1]))
                .collect(),
        }
    }

    /// Number of raw entries before validation
    pub fn raw_len(&self) -> usize {
        match self {
            Self::Pairs(pairs) => pairs.len(),
            Self::Tuples(tuples) => tuples.len(),
            Self::Flat(values) => values.len() / 2,
        }
    }
}

impl From<Vec<AnchorPair>> for AnchorInput {
    fn from(pairs: Vec<AnchorPair>) -> Self {
        Self::Pairs(pairs)
    }
}
