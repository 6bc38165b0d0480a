//! # Sync Engine
//!
//! Real-time alignment of a follower stream (B) to a reference stream (A).
//!
//! Responsibilities:
//! - `SyncController`: per-tick drift measurement, rate trim / seek
//!   correction, live delta smoothing
//! - Transport: coordinated play / pause / reset of the stream pair
//! - Tick sources: decoder frame callbacks or a fixed-rate timer
//! - `SyncLoop`: the async task owning controller and media, publishing
//!   throttled `TickOutput`s
//!
//! ## Usage
//!
//! ```ignore
//! use sync_engine::{SyncController, SyncLoop, TickSourceKind};
//!
//! let ticks = TickSourceKind::select(frame_rx, config.tick.timer_hz);
//! let sync_loop = SyncLoop::new(SyncController::new(config.controller), a, b, ticks, &config.tick);
//! let outcome = sync_loop.run(out_tx, cancel_rx).await;
//! ```

mod controller;
mod correction;
mod runner;
mod smoothing;
mod throttle;
mod tick;
pub mod transport;

pub use controller::SyncController;
pub use correction::CorrectionPlanner;
pub use runner::{StopReason, SyncCommand, SyncLoop, SyncLoopOutcome};
pub use smoothing::DeltaSmoother;
pub use throttle::PublishThrottle;
pub use tick::{FrameTickSource, TickSourceKind, TimerTickSource};

// Re-export contracts types
pub use contracts::{Correction, SyncControllerConfig, SyncMode, TickConfig, TickOutput};
