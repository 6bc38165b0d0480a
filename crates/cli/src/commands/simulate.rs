//! `simulate` command implementation.
//!
//! Plays two simulated streams through the sync loop for a fixed wall-clock
//! time, records the published deltas and summarizes the run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{
    AnalysisConfig, AnchorPair, ContractError, LapSummary, MediaSource, ReadyState,
    SyncControllerConfig, TickConfig, TickOutput,
};
use lap_analysis::{format_gap, format_lap_time, DeltaRateTracker, DeltaSampleStore, LapAnalysisEngine};
use observability::{TickMetricsAggregator, TickMetricsSummary};
use playback::{FrameClock, SimulatedMedia, SimulatedMediaConfig};
use serde::Serialize;
use sync_engine::{StopReason, SyncCommand, SyncController, SyncLoop, TickSourceKind};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use warp_mapper::{AnchorSet, WarpMapping};

use crate::cli::SimulateArgs;
use crate::error::CliError;

/// Everything the run needs, from a session file or the CLI defaults
struct SimulationPlan {
    title_a: String,
    title_b: String,
    lap_a: f64,
    lap_b: f64,
    anchors: Vec<AnchorPair>,
    controller: SyncControllerConfig,
    tick: TickConfig,
    analysis: AnalysisConfig,
}

impl SimulationPlan {
    fn resolve(args: &SimulateArgs) -> Result<Self> {
        match &args.session {
            Some(path) => {
                let session = super::load_session(path)?;
                let anchors = session.anchor_pairs();
                Ok(Self {
                    title_a: session.laps.title_a,
                    title_b: session.laps.title_b,
                    lap_a: session.laps.lap_a,
                    lap_b: session.laps.lap_b,
                    anchors,
                    controller: session.controller,
                    tick: session.tick,
                    analysis: session.analysis,
                })
            }
            None => {
                if !args.duration.is_finite() || args.duration <= 0.0 {
                    return Err(CliError::invalid_argument("duration", "must be finite and > 0").into());
                }
                Ok(Self {
                    title_a: "Car A".to_string(),
                    title_b: "Car B".to_string(),
                    lap_a: args.duration,
                    lap_b: args.duration,
                    anchors: Vec::new(),
                    controller: SyncControllerConfig::default(),
                    tick: TickConfig::default(),
                    analysis: AnalysisConfig::default(),
                })
            }
        }
    }

    /// Committed mapping, or `None` (identity) when too few anchors are paired
    fn mapping(&self) -> Option<Arc<WarpMapping>> {
        if self.anchors.is_empty() {
            return None;
        }
        let set = AnchorSet::from_pairs(self.anchors.iter().copied());
        match set.commit(self.analysis.min_commit_points) {
            Ok(mapping) => {
                observability::record_mapping_built(mapping.len());
                info!(points = mapping.len(), "Warp mapping committed");
                Some(Arc::new(mapping))
            }
            Err(ContractError::InsufficientAnchors { actual, .. }) => {
                observability::record_commit_rejected(actual);
                warn!(actual, "Too few anchors for a mapping, following reference time");
                None
            }
            Err(e) => {
                warn!(error = %e, "Mapping rejected, following reference time");
                None
            }
        }
    }
}

/// Run report for JSON output
#[derive(Serialize)]
struct SimulationReport {
    tick_source: &'static str,
    ticks: u64,
    published: u64,
    stop_reason: String,
    reference_position: f64,
    follower_position: f64,
    recorded_buckets: usize,
    gain_rate: f64,
    summary: LapSummary,
    #[serde(skip)]
    metrics: TickMetricsSummary,
}

/// Longest accepted run (one day)
const MAX_RUN_SECONDS: f64 = 86_400.0;

/// Wall-clock run length from `--seconds`
fn run_window(seconds: f64) -> Result<Duration, CliError> {
    if !seconds.is_finite() || seconds <= 0.0 || seconds > MAX_RUN_SECONDS {
        return Err(CliError::invalid_argument(
            "seconds",
            format!("must be in (0, {MAX_RUN_SECONDS}]"),
        ));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| CliError::invalid_argument("seconds", e.to_string()))
}

/// Execute the `simulate` command
pub async fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let run_for = run_window(args.seconds)?;
    let plan = SimulationPlan::resolve(args)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let reference = SimulatedMedia::new(SimulatedMediaConfig {
        identity: plan.title_a.clone(),
        duration: plan.lap_a,
        pace: args.pace_a,
        ready_state: ReadyState::EnoughData,
    });
    let follower = SimulatedMedia::new(SimulatedMediaConfig {
        identity: plan.title_b.clone(),
        duration: plan.lap_b,
        pace: args.pace_b,
        ready_state: ReadyState::EnoughData,
    });

    let mut controller = SyncController::new(plan.controller.clone());
    controller.set_warp(plan.mapping());

    let clock = args.fps.map(FrameClock::new);
    let frames = clock.as_ref().map(|c| c.start(plan.tick.channel_capacity));
    let ticks = TickSourceKind::select(frames, plan.tick.timer_hz);
    let tick_source = match &ticks {
        TickSourceKind::Frame(_) => "frame",
        TickSourceKind::Timer(_) => "timer",
    };

    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (out_tx, mut out_rx) = mpsc::channel(plan.tick.channel_capacity);
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let sync_loop = SyncLoop::new(controller, reference, follower, ticks, &plan.tick).with_commands(cmd_rx);
    let handle = tokio::spawn(sync_loop.run(out_tx, cancel_rx));

    cmd_tx
        .send(SyncCommand::Play)
        .await
        .map_err(|_| CliError::simulation("sync loop exited before play"))?;

    info!(
        tick_source,
        seconds = args.seconds,
        pace_a = args.pace_a,
        pace_b = args.pace_b,
        "Simulation running"
    );

    let mut recorder = RunRecorder::new(&plan.analysis, args.follow);
    let deadline = tokio::time::sleep(run_for);
    tokio::pin!(deadline);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping simulation...");
                break;
            }
            output = out_rx.recv() => match output {
                Some(output) => recorder.record(&output),
                None => break,
            },
        }
    }

    cancel_tx.send_replace(true);
    if let Some(clock) = &clock {
        clock.stop();
    }

    let outcome = handle
        .await
        .map_err(|e| CliError::simulation(format!("sync loop task failed: {e}")))?;
    while let Ok(output) = out_rx.try_recv() {
        recorder.record(&output);
    }

    if outcome.reason != StopReason::Cancelled {
        debug!(reason = ?outcome.reason, "Sync loop stopped on its own");
    }

    let engine = LapAnalysisEngine::new(plan.analysis.clone());
    let summary = engine.summarize(plan.lap_a, plan.lap_b, &plan.anchors, &recorder.store.snapshot());
    observability::record_summary_metrics(&summary);

    let report = SimulationReport {
        tick_source,
        ticks: outcome.ticks,
        published: outcome.published,
        stop_reason: format!("{:?}", outcome.reason),
        reference_position: outcome.reference.position(),
        follower_position: outcome.follower.position(),
        recorded_buckets: recorder.store.len(),
        gain_rate: recorder.rate.visible_rate(),
        summary,
        metrics: recorder.aggregator.summary(),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize simulation report")?;
        println!("{}", json);
    } else {
        print_report(&report, &plan);
    }

    info!("Simulation finished");
    Ok(())
}

/// Consumer side of the output channel
struct RunRecorder {
    store: DeltaSampleStore,
    aggregator: TickMetricsAggregator,
    rate: DeltaRateTracker,
    started: Instant,
    follow: bool,
}

impl RunRecorder {
    fn new(analysis: &AnalysisConfig, follow: bool) -> Self {
        Self {
            store: DeltaSampleStore::new(),
            aggregator: TickMetricsAggregator::new(),
            rate: DeltaRateTracker::from_config(analysis),
            started: Instant::now(),
            follow,
        }
    }

    fn record(&mut self, output: &TickOutput) {
        self.store.record_tick(output);
        self.aggregator.update(output);
        let rate = self.rate.push(self.started.elapsed(), output.smoothed_delta);

        if self.follow {
            println!(
                "{:>6.1}%  delta {:>7}  raw {:>7}  rate {:+.4} s/s  {}",
                output.progress * 100.0,
                format_gap(output.smoothed_delta),
                format_gap(output.raw_delta),
                rate,
                output.correction.label()
            );
        }
    }
}

fn print_report(report: &SimulationReport, plan: &SimulationPlan) {
    println!("=== Simulation ===");
    println!("Tick source: {}", report.tick_source);
    println!(
        "Ticks: {} (published {}), stopped: {}",
        report.ticks, report.published, report.stop_reason
    );
    println!(
        "Positions: {} {}  {} {}",
        plan.title_a,
        format_lap_time(report.reference_position),
        plan.title_b,
        format_lap_time(report.follower_position)
    );
    println!("Recorded progress buckets: {}", report.recorded_buckets);
    println!("Gain/loss rate: {:+.4} s/s", report.gain_rate);

    println!();
    print!("{}", report.metrics);

    let summary = &report.summary;
    println!("\n=== Lap Summary ===");
    println!("Theoretical best: {} ({:?})", format_lap_time(summary.theoretical_best), summary.method);
    println!("Saving: {}", format_gap(summary.theoretical_saving));
    println!("Consistency: {:.0}/100", summary.consistency_score);
    println!("Lead share {}: {:.0}%", plan.title_a, summary.lead_share_a);
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
