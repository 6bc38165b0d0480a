//! Progress-indexed delta record of one lap.
//!
//! One slot per 1% of lap progress. Each slot holds the latest delta seen
//! at that progress, not a history.

use std::fmt;

use contracts::{DeltaSample, TickOutput};
use tracing::debug;

/// Number of progress buckets (0% ..= 100%)
pub const BUCKET_COUNT: usize = 101;

/// Fixed-resolution delta store
#[derive(Clone)]
pub struct DeltaSampleStore {
    buckets: [Option<f64>; BUCKET_COUNT],
    written: usize,
    epoch: Option<u64>,
}

impl fmt::Debug for DeltaSampleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaSampleStore")
            .field("written", &self.written)
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl Default for DeltaSampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaSampleStore {
    pub fn new() -> Self {
        Self {
            buckets: [None; BUCKET_COUNT],
            written: 0,
            epoch: None,
        }
    }

    /// Overwrite the bucket of `progress` with `raw_delta`.
    ///
    /// Non-finite progress counts as 0; non-finite delta is stored as 0.
    #[inline]
    pub fn record(&mut self, progress: f64, raw_delta: f64) {
        let p = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let delta = if raw_delta.is_finite() { raw_delta } else { 0.0 };
        let bucket = (p * 100.0).round() as usize;

        let slot = &mut self.buckets[bucket.min(BUCKET_COUNT - 1)];
        if slot.is_none() {
            self.written += 1;
        }
        *slot = Some(delta);
    }

    /// Record one controller tick.
    ///
    /// The store is cleared first when the tick belongs to a new source
    /// epoch: progress buckets only mean something within one matched pair
    /// of streams.
    pub fn record_tick(&mut self, tick: &TickOutput) {
        if self.epoch != Some(tick.source_epoch) {
            if self.epoch.is_some() {
                debug!(
                    previous = ?self.epoch,
                    next = tick.source_epoch,
                    "source changed, clearing delta samples"
                );
            }
            self.clear();
            self.epoch = Some(tick.source_epoch);
        }
        self.record(tick.progress, tick.raw_delta);
    }

    /// Written buckets in ascending progress order
    pub fn snapshot(&self) -> Vec<DeltaSample> {
        self.buckets
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|delta| DeltaSample::new(i as f64 / 100.0, delta)))
            .collect()
    }

    /// Reset every bucket
    pub fn clear(&mut self) {
        self.buckets = [None; BUCKET_COUNT];
        self.written = 0;
    }

    /// Number of written buckets
    #[inline]
    pub fn len(&self) -> usize {
        self.written
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }
}
