//! TickSource trait - drives the sync loop
//!
//! A tick is either a decoded reference frame or a timer beat. The
//! controller's correction logic is identical for both.

use std::time::Duration;

/// Source of sync-loop ticks
///
/// `next_tick` resolves once per tick with the elapsed time since the
/// previous tick, or `None` when the source is exhausted.
#[trait_variant::make(TickSource: Send)]
pub trait LocalTickSource {
    /// Short name used for logging
    fn name(&self) -> &'static str;

    /// Wait for the next tick
    async fn next_tick(&mut self) -> Option<Duration>;
}
