//! `analyze` command implementation.

use anyhow::{Context, Result};
use contracts::{BestLapMethod, LapSummary, Segment, SessionBlueprint};
use lap_analysis::{format_gap, format_lap_time, LapAnalysisEngine};
use serde::Serialize;
use tracing::info;
use warp_mapper::{build_segments, normalize_anchors, rank_segments};

use crate::cli::AnalyzeArgs;

/// Analysis report for JSON output
#[derive(Serialize)]
struct AnalyzeReport {
    title_a: String,
    title_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    track: Option<String>,
    anchors: usize,
    samples: usize,
    summary: LapSummary,
    formatted: FormattedTimes,
    gains: Vec<Segment>,
    losses: Vec<Segment>,
}

#[derive(Serialize)]
struct FormattedTimes {
    lap_a: String,
    lap_b: String,
    best_lap: String,
    final_gap: String,
    theoretical_best: String,
    theoretical_saving: String,
}

impl From<&LapSummary> for FormattedTimes {
    fn from(summary: &LapSummary) -> Self {
        Self {
            lap_a: format_lap_time(summary.lap_a),
            lap_b: format_lap_time(summary.lap_b),
            best_lap: format_lap_time(summary.best_lap),
            final_gap: format_gap(summary.final_gap),
            theoretical_best: format_lap_time(summary.theoretical_best),
            theoretical_saving: format_gap(summary.theoretical_saving),
        }
    }
}

/// Execute the `analyze` command
pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let session = super::load_session(&args.session)?;
    let top = args.top.unwrap_or(session.analysis.top_segments);
    let report = build_report(&session, top);

    observability::record_summary_metrics(&report.summary);
    info!(
        method = ?report.summary.method,
        theoretical_best = report.summary.theoretical_best,
        saving = report.summary.theoretical_saving,
        "Lap analysis complete"
    );

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize analysis report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn build_report(session: &SessionBlueprint, top: usize) -> AnalyzeReport {
    let laps = &session.laps;
    let pairs = session.anchor_pairs();

    let engine = LapAnalysisEngine::new(session.analysis.clone());
    let summary = engine.summarize(laps.lap_a, laps.lap_b, &pairs, &session.delta_samples);

    let segments = normalize_anchors(&pairs, Some(laps.lap_a), Some(laps.lap_b))
        .map(|anchors| build_segments(&anchors))
        .unwrap_or_default();
    let ranked = rank_segments(&segments, top);

    AnalyzeReport {
        title_a: laps.title_a.clone(),
        title_b: laps.title_b.clone(),
        track: laps.track.clone(),
        anchors: pairs.len(),
        samples: session.delta_samples.len(),
        formatted: FormattedTimes::from(&summary),
        summary,
        gains: ranked.gains,
        losses: ranked.losses,
    }
}

fn print_report(report: &AnalyzeReport) {
    let summary = &report.summary;
    let formatted = &report.formatted;

    println!("=== Lap Comparison ===");
    if let Some(ref track) = report.track {
        println!("Track: {}", track);
    }
    println!("  {:<12} {}", report.title_a, formatted.lap_a);
    println!("  {:<12} {}", report.title_b, formatted.lap_b);
    println!("  Gap (B - A)  {}", formatted.final_gap);

    println!("\nTheoretical best");
    println!("  Time: {} (saving {})", formatted.theoretical_best, formatted.theoretical_saving);
    let method = match summary.method {
        BestLapMethod::Anchors => format!("anchor check-points ({})", report.anchors),
        BestLapMethod::Density => format!("delta density ({} samples)", report.samples),
    };
    println!("  Method: {}", method);

    println!("\nConsistency: {:.0}/100", summary.consistency_score);
    println!(
        "Lead share: {} ahead {:.0}%, {} ahead {:.0}%",
        report.title_a,
        summary.lead_share_a,
        report.title_b,
        100.0 - summary.lead_share_a
    );

    if !report.gains.is_empty() {
        println!("\nBiggest gains for {}:", report.title_b);
        for segment in &report.gains {
            print_segment(segment);
        }
    }
    if !report.losses.is_empty() {
        println!("\nBiggest losses for {}:", report.title_b);
        for segment in &report.losses {
            print_segment(segment);
        }
    }
}

fn print_segment(segment: &Segment) {
    println!(
        "  #{:<3} A {:>7.3}s  B {:>7.3}s  {}  (cum {})",
        segment.index + 1,
        segment.a_span,
        segment.b_span,
        format_gap(segment.seg_delta),
        format_gap(segment.cum_delta)
    );
}

#[cfg(test)]
mod tests {
    use contracts::{AnchorInput, AnchorPair, LapConfig};

    use super::*;

    fn session() -> SessionBlueprint {
        SessionBlueprint {
            version: Default::default(),
            laps: LapConfig {
                lap_a: 30.0,
                lap_b: 28.0,
                title_a: "Car A".into(),
                title_b: "Car B".into(),
                track: Some("Test Ring".into()),
            },
            anchors: AnchorInput::Pairs(vec![
                AnchorPair::new(0.0, 0.0),
                AnchorPair::new(10.0, 9.0),
                AnchorPair::new(20.0, 21.0),
                AnchorPair::new(30.0, 28.0),
            ]),
            delta_samples: Vec::new(),
            controller: Default::default(),
            tick: Default::default(),
            analysis: Default::default(),
        }
    }

    #[test]
    fn test_report_uses_anchor_integration() {
        let report = build_report(&session(), 3);
        assert_eq!(report.summary.method, BestLapMethod::Anchors);
        assert!((report.summary.theoretical_best - 26.0).abs() < 1e-9);
        assert_eq!(report.formatted.theoretical_best, "00:26.000");
        assert_eq!(report.formatted.final_gap, "-2.000");
    }

    #[test]
    fn test_report_ranks_segments() {
        let report = build_report(&session(), 1);
        assert_eq!(report.gains.len(), 1);
        assert_eq!(report.losses.len(), 1);
        // segment 3: A 10s, B 7s
        assert_eq!(report.gains[0].index, 2);
        assert_eq!(report.losses[0].index, 1);
    }
}
