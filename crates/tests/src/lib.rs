//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract snapshot tests (wire shapes of anchors and outputs)
//! - Simulated e2e runs: media -> sync loop -> sample store -> analysis
//! - Session file -> mapping -> analysis

#[cfg(test)]
mod contract_tests {
    use contracts::{AnchorInput, AnchorPair, Correction, TickOutput};

    #[test]
    fn test_anchor_pair_wire_shape() {
        let json = serde_json::to_value(AnchorPair::new(1.5, 1.25)).unwrap();
        assert_eq!(json["tA"], 1.5);
        assert_eq!(json["tB"], 1.25);
    }

    #[test]
    fn test_anchor_input_shapes_agree() {
        let pairs: AnchorInput = serde_json::from_str(r#"[{"tA":0,"tB":0},{"tA":10,"tB":9}]"#).unwrap();
        let tuples: AnchorInput = serde_json::from_str("[[0,0],[10,9]]").unwrap();
        let flat: AnchorInput = serde_json::from_str("[0,0,10,9,20]").unwrap();

        let expected = vec![AnchorPair::new(0.0, 0.0), AnchorPair::new(10.0, 9.0)];
        assert_eq!(pairs.into_pairs(), expected);
        assert_eq!(tuples.into_pairs(), expected);
        assert_eq!(flat.into_pairs(), expected);
    }

    #[test]
    fn test_tick_output_correction_tag() {
        let output = TickOutput {
            correction: Correction::Seek { step: -0.1 },
            ..Default::default()
        };
        let json = serde_json::to_value(output).unwrap();
        assert_eq!(json["correction"]["kind"], "seek");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        AnchorPair, BestLapMethod, Correction, MediaSource, ReadyState, TickConfig, TickOutput,
    };
    use lap_analysis::{DeltaSampleStore, LapAnalysisEngine};
    use observability::TickMetricsAggregator;
    use playback::{FrameClock, SimulatedMedia, SimulatedMediaConfig};
    use sync_engine::{
        StopReason, SyncCommand, SyncController, SyncLoop, SyncLoopOutcome, TickSourceKind,
    };
    use tokio::sync::{mpsc, watch};
    use warp_mapper::WarpMapping;

    fn media(identity: &str, duration: f64, pace: f64) -> SimulatedMedia {
        SimulatedMedia::new(SimulatedMediaConfig {
            identity: identity.to_string(),
            duration,
            pace,
            ready_state: ReadyState::EnoughData,
        })
    }

    /// Play for `run_for`, then cancel. Returns the loop outcome and every
    /// published output, collected by a separate consumer task.
    async fn run_session(
        controller: SyncController,
        reference: SimulatedMedia,
        follower: SimulatedMedia,
        ticks: TickSourceKind,
        run_for: Duration,
    ) -> (SyncLoopOutcome<SimulatedMedia, SimulatedMedia>, Vec<TickOutput>) {
        let config = TickConfig::default();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(config.channel_capacity);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let sync_loop = SyncLoop::new(controller, reference, follower, ticks, &config)
            .with_commands(cmd_rx);
        let loop_task = tokio::spawn(sync_loop.run(out_tx, cancel_rx));
        let consumer = tokio::spawn(async move {
            let mut outputs = Vec::new();
            while let Some(output) = out_rx.recv().await {
                outputs.push(output);
            }
            outputs
        });

        cmd_tx.send(SyncCommand::Play).await.unwrap();
        tokio::time::sleep(run_for).await;
        cancel_tx.send(true).unwrap();

        let outcome = loop_task.await.unwrap();
        let outputs = consumer.await.unwrap();
        (outcome, outputs)
    }

    /// End-to-end: SimulatedMedia -> SyncLoop -> DeltaSampleStore -> LapAnalysisEngine
    ///
    /// The follower plays 3% fast; the rate trim must hold the drift below
    /// the soft threshold without seeking.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_drift_held_by_rate_trim() {
        let controller = SyncController::default();
        let threshold = controller.config().soft_threshold_s;

        let (outcome, outputs) = run_session(
            controller,
            media("a.mp4", 30.0, 1.0),
            media("b.mp4", 30.0, 1.03),
            TickSourceKind::select(None, 60.0),
            Duration::from_secs(20),
        )
        .await;

        assert_eq!(outcome.reason, StopReason::Cancelled);
        assert!(outcome.published as usize == outputs.len());
        assert!(outputs.len() > 250, "published {}", outputs.len());

        let drift = outcome.reference.position() - outcome.follower.position();
        assert!(drift.abs() < threshold, "drift {drift}");
        assert!(outputs.iter().all(|o| !matches!(o.correction, Correction::Seek { .. })));
        assert!(matches!(
            outputs.last().unwrap().correction,
            Correction::RateTrim { rate } if rate < 1.0
        ));

        let mut store = DeltaSampleStore::new();
        let mut aggregator = TickMetricsAggregator::new();
        for output in &outputs {
            store.record_tick(output);
            aggregator.update(output);
        }
        assert!(store.len() > 50, "buckets {}", store.len());
        assert_eq!(aggregator.seeks, 0);

        let summary = LapAnalysisEngine::default().summarize(30.0, 30.0, &[], &store.snapshot());
        assert_eq!(summary.method, BestLapMethod::Density);
        assert!(summary.theoretical_saving >= 0.0);
        assert!(summary.theoretical_best <= 30.0);
        assert!((0.0..=100.0).contains(&summary.lead_share_a));
    }

    /// Follower tracks the warped target, not the reference clock
    #[tokio::test(start_paused = true)]
    async fn test_e2e_follower_tracks_warp_mapping() {
        let mapping = WarpMapping::build(&[AnchorPair::new(0.0, 0.0), AnchorPair::new(30.0, 27.0)]).unwrap();
        let mut controller = SyncController::default();
        controller.set_warp(Some(Arc::new(mapping)));

        let (outcome, outputs) = run_session(
            controller,
            media("a.mp4", 30.0, 1.0),
            media("b.mp4", 27.0, 0.9),
            TickSourceKind::select(None, 60.0),
            Duration::from_secs(10),
        )
        .await;

        let expected = outcome.reference.position() * 0.9;
        assert!((outcome.follower.position() - expected).abs() < 0.05);
        assert!(outputs.last().unwrap().raw_delta.abs() < 0.05);
    }

    /// Frame callbacks drive the loop when available
    #[tokio::test(start_paused = true)]
    async fn test_e2e_frame_clock_ticks() {
        let clock = FrameClock::new(30.0);
        let frames = clock.start(64);
        let ticks = TickSourceKind::select(Some(frames), 60.0);
        assert!(matches!(ticks, TickSourceKind::Frame(_)));

        let (outcome, outputs) = run_session(
            SyncController::default(),
            media("a.mp4", 30.0, 1.0),
            media("b.mp4", 30.0, 1.0),
            ticks,
            Duration::from_secs(2),
        )
        .await;
        clock.stop();

        assert!((50..=70).contains(&outcome.ticks), "ticks {}", outcome.ticks);
        assert!(!outputs.is_empty());
        assert!(outputs.iter().all(|o| o.raw_delta.abs() < 1e-6));
    }

    /// Loading a new follower clears the recorded lap
    #[tokio::test(start_paused = true)]
    async fn test_e2e_source_change_clears_store() {
        let mut controller = SyncController::default();
        let mut reference = media("a.mp4", 30.0, 1.0);
        let mut follower = media("b.mp4", 30.0, 1.0);
        reference.play();
        follower.play();

        let mut store = DeltaSampleStore::new();
        for _ in 0..20 {
            tokio::time::advance(Duration::from_millis(500)).await;
            store.record_tick(&controller.tick(&mut reference, &mut follower));
        }
        assert!(store.len() >= 20);

        follower.load("c.mp4", 30.0);
        let output = controller.tick(&mut reference, &mut follower);
        assert_eq!(output.source_epoch, 1);
        store.record_tick(&output);
        assert_eq!(store.len(), 1);
    }
}

#[cfg(test)]
mod session_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::BestLapMethod;
    use lap_analysis::{format_lap_time, LapAnalysisEngine};
    use warp_mapper::{build_segments, normalize_anchors, rank_segments, AnchorSet, WarpMapping};

    const SESSION: &str = r#"
anchors = [[0.0, 0.0], [5.0, 4.6], [10.0, 9.0], [15.0, 14.8], [20.0, 21.0], [30.0, 28.0]]

[laps]
lap_a = 30.0
lap_b = 28.0
title_a = "Hot lap"
title_b = "Rival"
track = "Test Ring"

[analysis]
top_segments = 2
"#;

    #[test]
    fn test_session_to_summary() {
        let session = ConfigLoader::load_from_str(SESSION, ConfigFormat::Toml).unwrap();
        let pairs = session.anchor_pairs();
        assert_eq!(pairs.len(), 6);

        let engine = LapAnalysisEngine::new(session.analysis.clone());
        let summary = engine.summarize(session.laps.lap_a, session.laps.lap_b, &pairs, &[]);

        // 4.6 + 4.4 + 5.0 + 5.0 + 7.0
        assert_eq!(summary.method, BestLapMethod::Anchors);
        assert!((summary.theoretical_best - 26.0).abs() < 1e-9);
        assert!((summary.theoretical_saving - 2.0).abs() < 1e-9);
        assert_eq!(format_lap_time(summary.theoretical_best), "00:26.000");
    }

    #[test]
    fn test_session_segments_and_mapping() {
        let session = ConfigLoader::load_from_str(SESSION, ConfigFormat::Toml).unwrap();
        let pairs = session.anchor_pairs();

        let anchors = normalize_anchors(&pairs, Some(30.0), Some(28.0)).unwrap();
        let segments = build_segments(&anchors);
        assert_eq!(segments.len(), 5);
        assert!((segments.last().unwrap().cum_delta + 2.0).abs() < 1e-9);

        let ranked = rank_segments(&segments, session.analysis.top_segments);
        assert_eq!(ranked.gains[0].index, 4);
        assert_eq!(ranked.losses[0].index, 3);

        // six points is exactly enough for an interactive commit
        let committed = AnchorSet::from_pairs(pairs.clone())
            .commit(session.analysis.min_commit_points)
            .unwrap();
        let direct = WarpMapping::build(&pairs).unwrap();
        assert_eq!(committed, direct);
        assert!((committed.map(25.0) - 24.5).abs() < 1e-9);
    }
}
