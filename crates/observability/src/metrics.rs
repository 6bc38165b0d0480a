//! Lap comparison metrics
//!
//! Per-tick gauges and counters are emitted by the sync controller itself;
//! this module covers on-demand results and an in-memory aggregator for
//! run summaries.

use contracts::{Correction, LapSummary, TickOutput};
use metrics::{counter, gauge, histogram};

/// Record a lap summary
///
/// # Example
///
/// ```ignore
/// let summary = engine.summarize(lap_a, lap_b, &anchors, &store.snapshot());
/// observability::metrics::record_summary_metrics(&summary);
/// ```
pub fn record_summary_metrics(summary: &LapSummary) {
    counter!("lapgap_summaries_total").increment(1);
    gauge!("lapgap_final_gap_seconds").set(summary.final_gap);
    gauge!("lapgap_theoretical_best_seconds").set(summary.theoretical_best);
    gauge!("lapgap_theoretical_saving_seconds").set(summary.theoretical_saving);
    gauge!("lapgap_consistency_score").set(summary.consistency_score);
    gauge!("lapgap_lead_share_a").set(summary.lead_share_a);
}

/// Record a committed warp mapping
pub fn record_mapping_built(points: usize) {
    counter!("lapgap_mappings_built_total").increment(1);
    histogram!("lapgap_mapping_points").record(points as f64);
}

/// Record an anchor commit rejected for lack of points
pub fn record_commit_rejected(actual: usize) {
    counter!("lapgap_commits_rejected_total").increment(1);
    histogram!("lapgap_rejected_commit_points").record(actual as f64);
}

/// Tick statistics aggregator
///
/// Aggregates published tick outputs in memory for a run summary.
#[derive(Debug, Clone, Default)]
pub struct TickMetricsAggregator {
    /// Outputs seen
    pub total_ticks: u64,

    /// Outputs with a rate trim
    pub rate_trims: u64,

    /// Outputs with a seek correction
    pub seeks: u64,

    /// Source epoch changes observed
    pub epoch_changes: u64,

    /// |raw delta| (ms)
    pub raw_delta_ms: RunningStats,

    /// Smoothed delta (s)
    pub smoothed_delta: RunningStats,

    /// Follower rate while trimming
    pub trim_rate: RunningStats,

    last_epoch: Option<u64>,
}

impl TickMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick output in
    pub fn update(&mut self, output: &TickOutput) {
        self.total_ticks += 1;

        if let Some(last) = self.last_epoch {
            if last != output.source_epoch {
                self.epoch_changes += 1;
            }
        }
        self.last_epoch = Some(output.source_epoch);

        match output.correction {
            Correction::RateTrim { rate } => {
                self.rate_trims += 1;
                self.trim_rate.push(rate);
            }
            Correction::Seek { .. } => self.seeks += 1,
            Correction::None => {}
        }

        self.raw_delta_ms.push(output.raw_delta.abs() * 1000.0);
        self.smoothed_delta.push(output.smoothed_delta);
    }

    /// Build the summary report
    pub fn summary(&self) -> TickMetricsSummary {
        let share = |count: u64| {
            if self.total_ticks > 0 {
                count as f64 / self.total_ticks as f64 * 100.0
            } else {
                0.0
            }
        };
        TickMetricsSummary {
            total_ticks: self.total_ticks,
            rate_trims: self.rate_trims,
            seeks: self.seeks,
            epoch_changes: self.epoch_changes,
            trim_share: share(self.rate_trims),
            seek_share: share(self.seeks),
            raw_delta_ms: StatsSummary::from(&self.raw_delta_ms),
            smoothed_delta: StatsSummary::from(&self.smoothed_delta),
            trim_rate: StatsSummary::from(&self.trim_rate),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Tick metrics summary
#[derive(Debug, Clone, Default)]
pub struct TickMetricsSummary {
    pub total_ticks: u64,
    pub rate_trims: u64,
    pub seeks: u64,
    pub epoch_changes: u64,
    pub trim_share: f64,
    pub seek_share: f64,
    pub raw_delta_ms: StatsSummary,
    pub smoothed_delta: StatsSummary,
    pub trim_rate: StatsSummary,
}

impl std::fmt::Display for TickMetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Metrics Summary ===")?;
        writeln!(f, "Published ticks: {}", self.total_ticks)?;
        writeln!(f, "Rate trims: {} ({:.2}%)", self.rate_trims, self.trim_share)?;
        writeln!(f, "Seek corrections: {} ({:.2}%)", self.seeks, self.seek_share)?;
        writeln!(f, "Source changes: {}", self.epoch_changes)?;
        writeln!(f, "|Raw delta| (ms): {}", self.raw_delta_ms)?;
        writeln!(f, "Live delta (s): {}", self.smoothed_delta)?;
        writeln!(f, "Trim rate: {}", self.trim_rate)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value; non-finite values are ignored
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(raw_delta: f64, correction: Correction, source_epoch: u64) -> TickOutput {
        TickOutput {
            smoothed_delta: raw_delta,
            progress: 0.5,
            raw_delta,
            correction,
            source_epoch,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }
        stats.push(f64::NAN);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = TickMetricsAggregator::new();
        aggregator.update(&output(0.1, Correction::RateTrim { rate: 1.05 }, 0));
        aggregator.update(&output(-0.5, Correction::Seek { step: -0.1 }, 0));
        aggregator.update(&output(0.0, Correction::None, 1));

        assert_eq!(aggregator.total_ticks, 3);
        assert_eq!(aggregator.rate_trims, 1);
        assert_eq!(aggregator.seeks, 1);
        assert_eq!(aggregator.epoch_changes, 1);
        assert!((aggregator.raw_delta_ms.max() - 500.0).abs() < 1e-9);
        assert!((aggregator.trim_rate.mean() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = TickMetricsAggregator::new();
        for _ in 0..3 {
            aggregator.update(&output(0.1, Correction::RateTrim { rate: 1.05 }, 0));
        }
        aggregator.update(&output(1.0, Correction::Seek { step: 0.1 }, 0));

        let text = aggregator.summary().to_string();
        assert!(text.contains("Published ticks: 4"));
        assert!(text.contains("Rate trims: 3 (75.00%)"));
        assert!(text.contains("Seek corrections: 1 (25.00%)"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = TickMetricsAggregator::new().summary();
        assert_eq!(summary.trim_share, 0.0);
        assert_eq!(summary.raw_delta_ms.to_string(), "N/A");
    }
}
