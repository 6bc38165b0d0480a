//! Live gain/loss rate of the delta.
//!
//! Rate is seconds of delta gained or lost per second of playback over a
//! rolling window, smoothed so it does not jitter tick to tick.

use std::collections::VecDeque;
use std::time::Duration;

use contracts::AnalysisConfig;

/// Below this smoothed rate the trend is treated as "tiny"
const MIN_RATE_CHANGE: f64 = 0.0005;
/// A tiny trend is still reported when the window moved at least this much
const MIN_WINDOW_DELTA: f64 = 0.0025;
/// Smallest magnitude reported for a tiny but real trend
const MIN_SHOWN_RATE: f64 = 0.0015;
/// Rolling window bounds (milliseconds)
const MIN_WINDOW_MS: f64 = 1.0;
const MAX_WINDOW_MS: f64 = 60_000.0;

/// Rolling-window delta slope with exponential smoothing
#[derive(Debug, Clone)]
pub struct DeltaRateTracker {
    window: Duration,
    alpha: f64,
    history: VecDeque<(Duration, f64)>,
    window_rate: f64,
    window_span_s: f64,
    window_change: f64,
    smoothed: f64,
}

impl DeltaRateTracker {
    /// `alpha` is clamped to `[0.01, 0.99]`.
    pub fn new(window: Duration, alpha: f64) -> Self {
        let alpha = if alpha.is_finite() { alpha } else { 0.2 };
        Self {
            window,
            alpha: alpha.clamp(0.01, 0.99),
            history: VecDeque::new(),
            window_rate: 0.0,
            window_span_s: 0.0,
            window_change: 0.0,
            smoothed: 0.0,
        }
    }

    /// The window is clamped to `[1 ms, 60 s]`.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let window_ms = if config.rate_window_ms.is_finite() {
            config.rate_window_ms.clamp(MIN_WINDOW_MS, MAX_WINDOW_MS)
        } else {
            900.0
        };
        Self::new(
            Duration::from_secs_f64(window_ms / 1000.0),
            config.rate_smoothing,
        )
    }

    /// Push the delta observed at `at` and return the visible rate.
    ///
    /// `at` must be monotonic (e.g. elapsed time since the session began).
    pub fn push(&mut self, at: Duration, delta: f64) -> f64 {
        let delta = if delta.is_finite() { delta } else { 0.0 };
        self.history.push_back((at, delta));

        let window_start = at.saturating_sub(self.window);
        while self
            .history
            .front()
            .is_some_and(|&(t, _)| t < window_start)
        {
            self.history.pop_front();
        }

        if let (Some(&(t0, d0)), Some(&(t1, d1))) = (self.history.front(), self.history.back()) {
            if self.history.len() >= 2 {
                let span = (t1 - t0).as_secs_f64();
                self.window_span_s = span;
                self.window_change = d1 - d0;
                if span > 0.0 {
                    self.window_rate = self.window_change / span;
                }
            }
        }

        self.smoothed = (1.0 - self.alpha) * self.smoothed + self.alpha * self.window_rate;
        self.visible_rate()
    }

    /// Smoothed rate with tiny-trend handling.
    ///
    /// A smoothed rate under 0.0005 s/s is shown as zero unless the window
    /// moved by at least 0.0025 s, in which case the trend direction is kept
    /// with a magnitude of at least 0.0015 s/s.
    pub fn visible_rate(&self) -> f64 {
        if self.smoothed.abs() >= MIN_RATE_CHANGE {
            return self.smoothed;
        }

        let change = self.window_change.abs();
        if self.window_span_s > 0.0 && change >= MIN_WINDOW_DELTA {
            let direction = if self.window_change < 0.0 { -1.0 } else { 1.0 };
            direction * MIN_SHOWN_RATE.max(change / self.window_span_s)
        } else {
            0.0
        }
    }

    /// Last unsmoothed window slope
    #[inline]
    pub fn window_rate(&self) -> f64 {
        self.window_rate
    }

    #[inline]
    pub fn smoothed_rate(&self) -> f64 {
        self.smoothed
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.history.clear();
        self.window_rate = 0.0;
        self.window_span_s = 0.0;
        self.window_change = 0.0;
        self.smoothed = 0.0;
    }
}

impl Default for DeltaRateTracker {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
