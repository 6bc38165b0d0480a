//! LapAnalysisEngine - on-demand lap comparison summary

use contracts::{AnalysisConfig, AnchorPair, DeltaSample, LapSummary};
use tracing::{debug, instrument};

use crate::best_lap::{theoretical_best_lap, BestLapInput};
use crate::scores::{consistency_score, lead_share_a};

/// Stateless lap statistics over a snapshot of anchors and delta samples.
#[derive(Debug, Clone, Default)]
pub struct LapAnalysisEngine {
    config: AnalysisConfig,
}

impl LapAnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Compute the lap summary.
    ///
    /// Theoretical best uses anchor integration when at least 2 anchors are
    /// given, otherwise the density integration of `samples`.
    #[instrument(
        name = "lap_summarize",
        skip(self, anchors, samples),
        fields(anchors = anchors.len(), samples = samples.len())
    )]
    pub fn summarize(
        &self,
        lap_a: f64,
        lap_b: f64,
        anchors: &[AnchorPair],
        samples: &[DeltaSample],
    ) -> LapSummary {
        let lap_a = sanitize_lap(lap_a);
        let lap_b = sanitize_lap(lap_b);
        let best_lap = lap_a.min(lap_b);

        let input = BestLapInput {
            lap_a,
            lap_b,
            anchors,
            samples,
        };
        let (theoretical_best, method) = theoretical_best_lap(&input, self.config.density_bins);
        let theoretical_saving = (best_lap - theoretical_best).max(0.0);

        let summary = LapSummary {
            lap_a,
            lap_b,
            best_lap,
            final_gap: lap_b - lap_a,
            theoretical_best,
            theoretical_saving,
            consistency_score: consistency_score(samples),
            lead_share_a: lead_share_a(samples),
            method,
        };

        debug!(
            best_lap = summary.best_lap,
            theoretical_best = summary.theoretical_best,
            method = ?summary.method,
            "lap summary computed"
        );
        summary
    }
}

fn sanitize_lap(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
