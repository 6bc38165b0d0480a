//! Tick sources driving the sync loop.
//!
//! Decoder frame callbacks give jitter-free ticks tied to the reference
//! stream; a fixed-rate timer is the fallback when no frame callback is
//! available. The controller does not know which one is in use.

use std::time::Duration;

use contracts::TickSource;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

/// Fixed-rate timer ticks
#[derive(Debug)]
pub struct TimerTickSource {
    interval: Interval,
    last: Option<Instant>,
}

impl TimerTickSource {
    /// `hz` is clamped to `[1, 1000]`.
    pub fn new(hz: f64) -> Self {
        let hz = if hz.is_finite() { hz.clamp(1.0, 1000.0) } else { 60.0 };
        let mut interval = interval(Duration::from_secs_f64(1.0 / hz));
        // a late tick is not worth replaying: positions are read fresh
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, last: None }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl TickSource for TimerTickSource {
    fn name(&self) -> &'static str {
        "timer"
    }

    async fn next_tick(&mut self) -> Option<Duration> {
        let now = self.interval.tick().await;
        let elapsed = self.last.map(|last| now - last).unwrap_or(Duration::ZERO);
        self.last = Some(now);
        Some(elapsed)
    }
}

/// Ticks driven by decoder frame callbacks
///
/// Each message is the presentation time of a reference frame; the source
/// ends when the sender side is dropped.
#[derive(Debug)]
pub struct FrameTickSource {
    frames: mpsc::Receiver<Duration>,
    last: Option<Duration>,
}

impl FrameTickSource {
    pub fn new(frames: mpsc::Receiver<Duration>) -> Self {
        Self { frames, last: None }
    }
}

impl TickSource for FrameTickSource {
    fn name(&self) -> &'static str {
        "frame"
    }

    async fn next_tick(&mut self) -> Option<Duration> {
        let presented = self.frames.recv().await?;
        let elapsed = self
            .last
            .map(|last| presented.saturating_sub(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(presented);
        Some(elapsed)
    }
}

/// Tick source chosen at startup
#[derive(Debug)]
pub enum TickSourceKind {
    Frame(FrameTickSource),
    Timer(TimerTickSource),
}

impl TickSourceKind {
    /// Prefer frame callbacks; fall back to a `timer_hz` timer.
    pub fn select(frames: Option<mpsc::Receiver<Duration>>, timer_hz: f64) -> Self {
        match frames {
            Some(rx) => Self::Frame(FrameTickSource::new(rx)),
            None => Self::Timer(TimerTickSource::new(timer_hz)),
        }
    }
}

impl TickSource for TickSourceKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Frame(source) => source.name(),
            Self::Timer(source) => source.name(),
        }
    }

    async fn next_tick(&mut self) -> Option<Duration> {
        match self {
            Self::Frame(source) => source.next_tick().await,
            Self::Timer(source) => source.next_tick().await,
        }
    }
}
