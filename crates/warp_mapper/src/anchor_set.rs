//! Interactive anchor editing for the alignment flow.

use contracts::{AnchorPair, ContractError};
use tracing::{debug, warn};

use crate::WarpMapping;

/// Anchors of one session, as the user pairs them.
///
/// Lap start `(0, 0)` and lap end `(lap_a, lap_b)` are seeded as locked
/// pairs and cannot be removed.
#[derive(Debug, Clone, Default)]
pub struct AnchorSet {
    pairs: Vec<AnchorPair>,
}

impl AnchorSet {
    /// Empty set without locked endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set seeded with locked lap start and lap end
    pub fn for_lap(lap_a: f64, lap_b: f64) -> Self {
        let mut pairs = vec![AnchorPair::locked(0.0, 0.0)];
        if lap_a.is_finite() && lap_b.is_finite() && lap_a > 0.0 && lap_b > 0.0 {
            pairs.push(AnchorPair::locked(lap_a, lap_b));
        }
        Self { pairs }
    }

    /// Set built from imported, already committed pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = AnchorPair>) -> Self {
        let mut set = Self {
            pairs: pairs.into_iter().filter(AnchorPair::is_valid).collect(),
        };
        set.sort();
        set
    }

    /// Add a matched pair, returning its index after ordering by A-time.
    ///
    /// # Errors
    /// `InvalidAnchor` for non-finite or negative times.
    pub fn add(&mut self, time_a: f64, time_b: f64) -> Result<usize, ContractError> {
        let pair = AnchorPair::new(time_a, time_b);
        if !pair.is_valid() {
            return Err(ContractError::invalid_anchor(
                time_a,
                time_b,
                "times must be finite and non-negative",
            ));
        }

        let index = self.pairs.partition_point(|p| p.time_a <= time_a);
        self.pairs.insert(index, pair);
        debug!(index, time_a, time_b, total = self.pairs.len(), "anchor added");
        Ok(index)
    }

    /// Remove an unlocked pair.
    ///
    /// # Errors
    /// `AnchorIndex` when out of range, `LockedAnchor` for lap start/end.
    pub fn remove(&mut self, index: usize) -> Result<AnchorPair, ContractError> {
        let pair = self.pairs.get(index).ok_or(ContractError::AnchorIndex {
            index,
            len: self.pairs.len(),
        })?;
        if pair.locked {
            return Err(ContractError::LockedAnchor { index });
        }
        Ok(self.pairs.remove(index))
    }

    /// Index of the pair closest to `time_a`
    pub fn nearest(&self, time_a: f64) -> Option<usize> {
        self.pairs
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.time_a - time_a)
                    .abs()
                    .total_cmp(&(b.time_a - time_a).abs())
            })
            .map(|(i, _)| i)
    }

    /// Commit the set into a mapping.
    ///
    /// # Errors
    /// `InsufficientAnchors` when fewer than `min_points` matched points exist;
    /// too sparse a set is rejected rather than silently mapped.
    pub fn commit(&self, min_points: usize) -> Result<WarpMapping, ContractError> {
        if self.pairs.len() < min_points {
            warn!(
                required = min_points,
                actual = self.pairs.len(),
                "anchor commit rejected"
            );
            return Err(ContractError::InsufficientAnchors {
                required: min_points,
                actual: self.pairs.len(),
            });
        }
        WarpMapping::build(&self.pairs)
    }

    /// Ordered `{tA, tB}` list for export
    pub fn to_persisted(&self) -> Vec<AnchorPair> {
        self.pairs.clone()
    }

    pub fn pairs(&self) -> &[AnchorPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn sort(&mut self) {
        self.pairs.sort_by(|a, b| a.time_a.total_cmp(&b.time_a));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_set(extra: usize) -> AnchorSet {
        let mut set = AnchorSet::for_lap(60.0, 58.0);
        for i in 1..=extra {
            let t = i as f64 * 10.0;
            set.add(t, t * 0.97).unwrap();
        }
        set
    }

    #[test]
    fn test_for_lap_seeds_locked_endpoints() {
        let set = AnchorSet::for_lap(60.0, 58.0);
        assert_eq!(set.len(), 2);
        assert!(set.pairs().iter().all(|p| p.locked));
    }

    #[test]
    fn test_add_keeps_order() {
        let mut set = AnchorSet::for_lap(60.0, 58.0);
        let idx = set.add(30.0, 29.0).unwrap();
        assert_eq!(idx, 1);
        let idx = set.add(10.0, 9.5).unwrap();
        assert_eq!(idx, 1);
        let times: Vec<f64> = set.pairs().iter().map(|p| p.time_a).collect();
        assert_eq!(times, vec![0.0, 10.0, 30.0, 60.0]);
    }

    #[test]
    fn test_add_rejects_invalid_times() {
        let mut set = AnchorSet::new();
        assert!(matches!(
            set.add(f64::NAN, 1.0),
            Err(ContractError::InvalidAnchor { .. })
        ));
        assert!(set.add(1.0, -0.5).is_err());
    }

    #[test]
    fn test_locked_pairs_cannot_be_removed() {
        let mut set = filled_set(2);
        assert!(matches!(
            set.remove(0),
            Err(ContractError::LockedAnchor { index: 0 })
        ));
        let removed = set.remove(1).unwrap();
        assert_eq!(removed.time_a, 10.0);
        assert!(matches!(
            set.remove(42),
            Err(ContractError::AnchorIndex { index: 42, .. })
        ));
    }

    #[test]
    fn test_commit_requires_six_points() {
        let sparse = filled_set(3);
        assert_eq!(sparse.len(), 5);
        assert!(matches!(
            sparse.commit(6),
            Err(ContractError::InsufficientAnchors {
                required: 6,
                actual: 5
            })
        ));

        let dense = filled_set(4);
        let mapping = dense.commit(6).unwrap();
        assert_eq!(mapping.len(), 6);
        assert_eq!(mapping.map(60.0), 58.0);
    }

    #[test]
    fn test_nearest_anchor() {
        let set = filled_set(2);
        assert_eq!(set.nearest(12.0), Some(1));
        assert_eq!(set.nearest(59.0), Some(3));
        assert_eq!(AnchorSet::new().nearest(1.0), None);
    }

    #[test]
    fn test_from_pairs_sorts_and_filters() {
        let set = AnchorSet::from_pairs(vec![
            AnchorPair::new(5.0, 5.0),
            AnchorPair::new(f64::INFINITY, 1.0),
            AnchorPair::new(1.0, 1.0),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.pairs()[0].time_a, 1.0);
    }
}
