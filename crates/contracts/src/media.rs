//! MediaSource trait - time-addressable media abstraction
//!
//! Decoding and rendering are external collaborators. The sync core only
//! needs a readable position, a duration, transport operations, and a
//! readiness/buffering view.

use tokio::sync::watch;

/// Decoder readiness, ordered from "nothing known" to "can play through"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// Nothing loaded
    #[default]
    Empty,
    /// Duration and dimensions known, no frame decoded
    Metadata,
    /// Current frame decoded
    CurrentData,
    /// Enough data to advance at least one frame
    FutureData,
    /// Enough data to play without stalling
    EnoughData,
}

impl ReadyState {
    /// Playback may start without an immediate stall
    #[inline]
    pub fn can_play(self) -> bool {
        self >= ReadyState::CurrentData
    }
}

/// Buffered region of the media timeline (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    #[inline]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    /// Closest point of this range to `t`
    #[inline]
    pub fn nearest(&self, t: f64) -> f64 {
        t.clamp(self.start, self.end)
    }
}

/// Time-addressable media handle
///
/// Implemented by real players (outside this workspace) and by the
/// simulated media of the `playback` crate.
///
/// # Design Principles
///
/// 1. **Single owner**: the sync loop owns both handles; no interior locking
/// 2. **Non-blocking**: every call returns immediately; readiness is observed
///    through a `watch` channel
pub trait MediaSource {
    /// Stable identity of the loaded media; changes when new media is loaded
    fn identity(&self) -> &str;

    /// Current playback position (seconds)
    fn position(&self) -> f64;

    /// Total duration (seconds); non-finite or ≤ 0 when unknown
    fn duration(&self) -> f64;

    /// Whether playback is running
    fn is_playing(&self) -> bool;

    /// Start playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Jump to `t` seconds
    fn seek(&mut self, t: f64);

    /// Current playback rate
    fn rate(&self) -> f64;

    /// Set playback rate
    fn set_rate(&mut self, rate: f64);

    /// Current readiness
    fn ready_state(&self) -> ReadyState;

    /// Readiness change notifications
    fn readiness(&self) -> watch::Receiver<ReadyState>;

    /// Buffered regions, ascending
    fn buffered(&self) -> Vec<TimeRange>;

    /// Decoder is stalled waiting for data
    fn is_stalled(&self) -> bool;
}
