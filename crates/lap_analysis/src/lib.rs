//! # Lap Analysis
//!
//! Turns the rolling per-progress delta log and the anchor set into lap
//! performance statistics.
//!
//! Responsibilities:
//! - `DeltaSampleStore`: fixed 101-bucket progress-indexed delta record
//! - Theoretical best lap (anchor or density integration)
//! - Consistency score and lead share
//! - Live gain/loss rate of the delta
//! - Lap time formatting
//!
//! Every computation is a pure function of its inputs.
//!
//! ## Example
//!
//! ```
//! use contracts::{AnalysisConfig, AnchorPair};
//! use lap_analysis::LapAnalysisEngine;
//!
//! let engine = LapAnalysisEngine::new(AnalysisConfig::default());
//! let anchors = [
//!     AnchorPair::new(0.0, 0.0),
//!     AnchorPair::new(10.0, 9.0),
//!     AnchorPair::new(20.0, 21.0),
//!     AnchorPair::new(30.0, 28.0),
//! ];
//! let summary = engine.summarize(30.0, 28.0, &anchors, &[]);
//! assert!(summary.theoretical_best <= 28.0);
//! ```

mod best_lap;
mod engine;
mod format;
mod rate;
mod samples;
mod scores;
mod store;

pub use best_lap::{
    select_strategy, theoretical_best_lap, AnchorIntegration, BestLapInput, BestLapStrategy,
    DensityIntegration,
};
pub use engine::LapAnalysisEngine;
pub use format::{format_gap, format_lap_time};
pub use rate::DeltaRateTracker;
pub use samples::normalize_samples;
pub use scores::{consistency_score, lead_share_a};
pub use store::{DeltaSampleStore, BUCKET_COUNT};
