//! Publish rate limiting, independent of the tick rate.

use std::time::Duration;

use tokio::time::Instant;

/// Slowest publish rate; lower rates are raised to it
const MIN_PUBLISH_HZ: f64 = 0.001;

/// Lets at most one output through per interval
#[derive(Debug, Clone)]
pub struct PublishThrottle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl PublishThrottle {
    /// `hz <= 0` or non-finite disables throttling; positive rates are
    /// floored at 0.001 Hz.
    pub fn new(hz: f64) -> Self {
        let min_interval = if hz.is_finite() && hz > 0.0 {
            Duration::from_secs_f64(1.0 / hz.max(MIN_PUBLISH_HZ))
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last: None,
        }
    }

    /// Whether an output produced at `now` should be published.
    #[inline]
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Publish the next output unconditionally
    pub fn reset(&mut self) {
        self.last = None;
    }
}
