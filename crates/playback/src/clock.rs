//! Simulated decoder frame clock
//!
//! Emits one frame callback per presented frame of the reference stream,
//! the way a real decoder would notify the sync loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Fixed frame-rate callback source
pub struct FrameClock {
    fps: f64,
    running: Arc<AtomicBool>,
}

impl FrameClock {
    /// `fps` is clamped to `[1, 1000]`.
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() { fps.clamp(1.0, 1000.0) } else { 30.0 };
        Self {
            fps,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Start emitting frames; each message is the elapsed time since start.
    pub fn start(&self, channel_capacity: usize) -> mpsc::Receiver<Duration> {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let fps = self.fps;
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs_f64(1.0 / fps));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let start = Instant::now();
            let mut frame: u64 = 0;

            debug!(fps, "frame clock started");

            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                frame += 1;

                if tx.send(start.elapsed()).await.is_err() {
                    debug!("frame clock channel closed");
                    break;
                }
                trace!(frame, "frame presented");
            }

            running.store(false, Ordering::SeqCst);
            debug!(frames = frame, "frame clock stopped");
        });

        rx
    }

    /// Stop emitting frames; the receiver then drains and closes.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
