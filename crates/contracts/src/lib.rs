//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - All times are media seconds (f64) on the stream's own timeline
//! - Stream A is the reference clock, stream B the follower
//! - Progress is the reference position normalized to `[0, 1]`

mod anchor;
mod error;
mod media;
mod sample;
mod session;
mod summary;
mod sync_config;
mod tick;

pub use anchor::*;
pub use error::*;
pub use media::{MediaSource, ReadyState, TimeRange};
pub use sample::*;
pub use session::*;
pub use summary::*;
pub use sync_config::*;
pub use tick::{LocalTickSource, TickSource};
