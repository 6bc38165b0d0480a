//! Simulated media source
//!
//! Position is derived from the tokio clock: `base + elapsed * rate * pace`
//! while playing. Every transport call rebases so rate changes apply from
//! the moment they are made.

use std::sync::Arc;

use contracts::{MediaSource, ReadyState, TimeRange};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Simulated media configuration
#[derive(Debug, Clone)]
pub struct SimulatedMediaConfig {
    /// Media identity (e.g. file name)
    pub identity: String,

    /// Duration (seconds)
    pub duration: f64,

    /// Intrinsic speed error; 1.0 plays in real time
    pub pace: f64,

    /// Initial readiness
    pub ready_state: ReadyState,
}

impl Default for SimulatedMediaConfig {
    fn default() -> Self {
        Self {
            identity: "simulated".to_string(),
            duration: 60.0,
            pace: 1.0,
            ready_state: ReadyState::EnoughData,
        }
    }
}

/// Handle to drive the readiness of a `SimulatedMedia` from another task
#[derive(Debug, Clone)]
pub struct ReadinessHandle {
    tx: Arc<watch::Sender<ReadyState>>,
}

impl ReadinessHandle {
    pub fn set(&self, state: ReadyState) {
        self.tx.send_replace(state);
    }

    pub fn get(&self) -> ReadyState {
        *self.tx.borrow()
    }
}

/// Simulated media source
#[derive(Debug)]
pub struct SimulatedMedia {
    identity: String,
    duration: f64,
    pace: f64,
    base_position: f64,
    base_instant: Instant,
    playing: bool,
    rate: f64,
    stalled: bool,
    buffered: Vec<TimeRange>,
    ready_tx: Arc<watch::Sender<ReadyState>>,
}

impl SimulatedMedia {
    pub fn new(config: SimulatedMediaConfig) -> Self {
        let duration = if config.duration.is_finite() {
            config.duration.max(0.0)
        } else {
            config.duration
        };
        let (ready_tx, _) = watch::channel(config.ready_state);
        Self {
            identity: config.identity,
            duration,
            pace: if config.pace.is_finite() && config.pace > 0.0 {
                config.pace
            } else {
                1.0
            },
            base_position: 0.0,
            base_instant: Instant::now(),
            playing: false,
            rate: 1.0,
            stalled: false,
            buffered: full_range(duration),
            ready_tx: Arc::new(ready_tx),
        }
    }

    /// Ready-to-play media of `duration` seconds
    pub fn with_duration(identity: &str, duration: f64) -> Self {
        Self::new(SimulatedMediaConfig {
            identity: identity.to_string(),
            duration,
            ..Default::default()
        })
    }

    /// Readiness driver for this media
    pub fn readiness_handle(&self) -> ReadinessHandle {
        ReadinessHandle {
            tx: self.ready_tx.clone(),
        }
    }

    /// Set readiness
    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_tx.send_replace(state);
    }

    /// Replace the buffered ranges
    pub fn set_buffered(&mut self, mut ranges: Vec<TimeRange>) {
        ranges.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.buffered = ranges;
    }

    /// Freeze playback as if the decoder ran out of data
    pub fn stall(&mut self) {
        self.rebase();
        self.stalled = true;
        debug!(identity = %self.identity, position = self.base_position, "simulated stall");
    }

    /// Load new media; position, rate and stall state are reset.
    pub fn load(&mut self, identity: &str, duration: f64) {
        self.identity = identity.to_string();
        self.duration = duration;
        self.base_position = 0.0;
        self.base_instant = Instant::now();
        self.playing = false;
        self.rate = 1.0;
        self.stalled = false;
        self.buffered = full_range(duration);
        debug!(identity, duration, "simulated media loaded");
    }

    fn clamp_position(&self, t: f64) -> f64 {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        if self.duration.is_finite() && self.duration > 0.0 {
            t.min(self.duration)
        } else {
            t
        }
    }

    /// Fold elapsed playback into the base position.
    fn rebase(&mut self) {
        self.base_position = self.position();
        self.base_instant = Instant::now();
    }
}

impl MediaSource for SimulatedMedia {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn position(&self) -> f64 {
        if !self.playing || self.stalled {
            return self.base_position;
        }
        let elapsed = self.base_instant.elapsed().as_secs_f64();
        self.clamp_position(self.base_position + elapsed * self.rate * self.pace)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) {
        if !self.playing {
            self.base_instant = Instant::now();
            self.playing = true;
            trace!(identity = %self.identity, position = self.base_position, "play");
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.rebase();
            self.playing = false;
            trace!(identity = %self.identity, position = self.base_position, "pause");
        }
    }

    fn seek(&mut self, t: f64) {
        self.base_position = self.clamp_position(t);
        self.base_instant = Instant::now();
        if self.stalled && self.buffered.iter().any(|r| r.contains(self.base_position)) {
            self.stalled = false;
        }
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 && rate != self.rate {
            self.rebase();
            self.rate = rate;
        }
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready_tx.borrow()
    }

    fn readiness(&self) -> watch::Receiver<ReadyState> {
        self.ready_tx.subscribe()
    }

    fn buffered(&self) -> Vec<TimeRange> {
        self.buffered.clone()
    }

    fn is_stalled(&self) -> bool {
        self.stalled
    }
}

fn full_range(duration: f64) -> Vec<TimeRange> {
    if duration.is_finite() && duration > 0.0 {
        vec![TimeRange::new(0.0, duration)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_position_follows_clock_and_rate() {
        let mut media = SimulatedMedia::with_duration("a.mp4", 30.0);
        assert_eq!(media.position(), 0.0);

        media.play();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!((media.position() - 2.0).abs() < 1e-6);

        media.set_rate(1.5);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!((media.position() - 5.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_and_duration_clamps() {
        let mut media = SimulatedMedia::with_duration("a.mp4", 3.0);
        media.play();
        tokio::time::advance(Duration::from_secs(1)).await;
        media.pause();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!((media.position() - 1.0).abs() < 1e-6);

        media.play();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(media.position(), 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pace_introduces_drift() {
        let mut media = SimulatedMedia::new(SimulatedMediaConfig {
            identity: "b.mp4".to_string(),
            duration: 60.0,
            pace: 1.1,
            ..Default::default()
        });
        media.play();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!((media.position() - 11.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_and_seek_recovery() {
        let mut media = SimulatedMedia::with_duration("a.mp4", 30.0);
        media.set_buffered(vec![TimeRange::new(0.0, 5.0), TimeRange::new(8.0, 30.0)]);
        media.play();
        tokio::time::advance(Duration::from_secs(1)).await;
        media.stall();
        assert!(media.is_stalled());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!((media.position() - 1.0).abs() < 1e-6);

        media.seek(6.0);
        assert!(media.is_stalled());
        media.seek(8.0);
        assert!(!media.is_stalled());
    }

    #[tokio::test]
    async fn test_readiness_notifications() {
        let media = SimulatedMedia::new(SimulatedMediaConfig {
            ready_state: ReadyState::Metadata,
            ..Default::default()
        });
        let mut rx = media.readiness();
        let handle = media.readiness_handle();

        handle.set(ReadyState::EnoughData);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ReadyState::EnoughData);
        assert_eq!(media.ready_state(), ReadyState::EnoughData);
    }

    #[test]
    fn test_load_changes_identity_and_resets() {
        let mut media = SimulatedMedia::with_duration("a.mp4", 30.0);
        media.seek(10.0);
        media.set_rate(1.05);
        media.load("c.mp4", 40.0);
        assert_eq!(media.identity(), "c.mp4");
        assert_eq!(media.position(), 0.0);
        assert_eq!(media.rate(), 1.0);
        assert_eq!(media.buffered(), vec![TimeRange::new(0.0, 40.0)]);
    }
}
