//! SyncController - per-tick alignment of the follower to the reference.
//!
//! Stream A is the reference clock, stream B the follower. Every tick reads
//! both positions, measures the drift against the warp mapping, corrects
//! the follower and returns a `TickOutput`. The controller owns its state
//! exclusively; consumers only ever see returned values.

use std::sync::Arc;

use contracts::{Correction, MediaSource, SyncControllerConfig, SyncMode, TickOutput};
use tracing::{debug, instrument, trace, warn};
use warp_mapper::{map_a_to_b, WarpMapping};

use crate::correction::CorrectionPlanner;
use crate::smoothing::DeltaSmoother;

/// Closed-loop alignment controller
#[derive(Debug)]
pub struct SyncController {
    config: SyncControllerConfig,
    planner: CorrectionPlanner,
    smoother: DeltaSmoother,
    mapping: Option<Arc<WarpMapping>>,
    mode: SyncMode,
    /// Identities seen on the previous tick
    identities: Option<(String, String)>,
    source_epoch: u64,
    /// Snap the follower onto the target on the next playing tick
    pending_snap: bool,
    tick_count: u64,
}

impl SyncController {
    pub fn new(config: SyncControllerConfig) -> Self {
        Self {
            planner: CorrectionPlanner::new(&config),
            smoother: DeltaSmoother::new(config.smoothing_alpha),
            config,
            mapping: None,
            mode: SyncMode::FreeRun,
            identities: None,
            source_epoch: 0,
            pending_snap: false,
            tick_count: 0,
        }
    }

    /// Replace the warp mapping; `None` maps with identity.
    pub fn set_warp(&mut self, mapping: Option<Arc<WarpMapping>>) {
        debug!(
            points = mapping.as_ref().map(|m| m.len()).unwrap_or(0),
            "warp mapping replaced"
        );
        self.mapping = mapping;
    }

    pub fn warp(&self) -> Option<&Arc<WarpMapping>> {
        self.mapping.as_ref()
    }

    pub fn set_mode(&mut self, mode: SyncMode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "sync mode changed");
            self.mode = mode;
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Forget the smoothed delta
    pub fn reset_state(&mut self) {
        self.smoother.reset();
        self.pending_snap = false;
    }

    /// Snap the follower onto the mapped reference position on the first
    /// tick where both streams are playing.
    pub fn request_snap(&mut self) {
        self.pending_snap = true;
    }

    pub fn source_epoch(&self) -> u64 {
        self.source_epoch
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SyncControllerConfig {
        &self.config
    }

    /// Follower position the mapping predicts for reference time `t_ref`
    #[inline]
    pub fn target_for(&self, t_ref: f64) -> f64 {
        map_a_to_b(self.mapping.as_deref(), t_ref)
    }

    /// Run one tick.
    #[instrument(
        level = "trace",
        name = "sync_controller_tick",
        skip(self, reference, follower),
        fields(epoch = self.source_epoch)
    )]
    pub fn tick<R, F>(&mut self, reference: &mut R, follower: &mut F) -> TickOutput
    where
        R: MediaSource + ?Sized,
        F: MediaSource + ?Sized,
    {
        self.tick_count += 1;

        self.check_identity(reference, follower);
        recover_stall(reference);
        recover_stall(follower);

        let both_playing = reference.is_playing() && follower.is_playing();
        let t_ref = finite_or_zero(reference.position());

        if self.pending_snap && both_playing {
            follower.seek(self.target_for(t_ref));
            self.pending_snap = false;
            trace!(t_ref, "follower snapped on first frame");
        }

        let t_follower = finite_or_zero(follower.position());
        let raw_delta = self.target_for(t_ref) - t_follower;

        let active = both_playing && self.mode == SyncMode::FreeRun;
        let correction = self.planner.plan(raw_delta, active);
        self.apply(&correction, follower, t_follower);

        let smoothed_delta = self.smoother.update(raw_delta);
        let progress = progress_of(t_ref, reference.duration());

        metrics::counter!("lapgap_ticks_total").increment(1);
        metrics::gauge!("lapgap_live_delta").set(smoothed_delta);
        metrics::histogram!("lapgap_raw_delta").record(raw_delta);
        metrics::counter!("lapgap_corrections_total", "kind" => correction.label()).increment(1);

        TickOutput {
            smoothed_delta,
            progress,
            raw_delta,
            correction,
            source_epoch: self.source_epoch,
        }
    }

    fn apply<F>(&self, correction: &Correction, follower: &mut F, t_follower: f64)
    where
        F: MediaSource + ?Sized,
    {
        if let Correction::Seek { step } = *correction {
            follower.seek((t_follower + step).max(0.0));
            debug!(step, t_follower, "follower seek correction");
        }

        let rate = CorrectionPlanner::follower_rate(correction);
        if follower.rate() != rate {
            follower.set_rate(rate);
            trace!(rate, "follower rate set");
        }
    }

    fn check_identity<R, F>(&mut self, reference: &R, follower: &mut F)
    where
        R: MediaSource + ?Sized,
        F: MediaSource + ?Sized,
    {
        let changed = match &self.identities {
            Some((a, b)) => a != reference.identity() || b != follower.identity(),
            None => {
                self.identities = Some((reference.identity().to_string(), follower.identity().to_string()));
                return;
            }
        };

        if changed {
            self.source_epoch += 1;
            self.smoother.reset();
            self.identities = Some((reference.identity().to_string(), follower.identity().to_string()));
            follower.set_rate(1.0);
            debug!(
                epoch = self.source_epoch,
                reference = reference.identity(),
                follower = follower.identity(),
                "media source changed"
            );
        }
    }
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new(SyncControllerConfig::default())
    }
}

/// Seek a stalled stream to the nearest buffered position.
fn recover_stall<M>(media: &mut M)
where
    M: MediaSource + ?Sized,
{
    if !media.is_stalled() {
        return;
    }
    let position = finite_or_zero(media.position());
    let nearest = media
        .buffered()
        .iter()
        .map(|range| range.nearest(position))
        .min_by(|a, b| (a - position).abs().total_cmp(&(b - position).abs()));

    match nearest {
        Some(target) => {
            warn!(
                identity = media.identity(),
                position,
                target,
                "stream stalled, seeking to nearest buffered position"
            );
            metrics::counter!("lapgap_stall_recoveries_total").increment(1);
            media.seek(target);
        }
        None => {
            trace!(identity = media.identity(), "stream stalled with nothing buffered");
        }
    }
}

/// Reference progress in `[0, 1]`; 0 when the duration is unknown.
#[inline]
fn progress_of(t_ref: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        (t_ref / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
