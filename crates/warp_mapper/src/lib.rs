//! # Warp Mapper
//!
//! Monotonic piecewise-linear mapping between two lap timelines.
//!
//! Responsibilities:
//! - Build a `WarpMapping` from matched anchor pairs
//! - Map any A-timestamp to the equivalent B-timestamp
//! - Interactive anchor editing with locked lap start/end (`AnchorSet`)
//! - Per-segment gain/loss table between consecutive anchors
//!
//! ## Example
//!
//! ```
//! use contracts::AnchorPair;
//! use warp_mapper::WarpMapping;
//!
//! let mapping = WarpMapping::build(&[
//!     AnchorPair::new(0.0, 0.0),
//!     AnchorPair::new(10.0, 8.0),
//!     AnchorPair::new(20.0, 20.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(mapping.map(15.0), 14.0);
//! ```

mod anchor_set;
mod mapping;
mod segments;

pub use anchor_set::AnchorSet;
pub use mapping::{delta_rate, map_a_to_b, WarpMapping};
pub use segments::{build_segments, normalize_anchors, rank_segments, NormalizedAnchors, RankedSegments};
