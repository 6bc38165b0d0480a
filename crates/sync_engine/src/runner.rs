//! SyncLoop - the task owning the controller and both media handles.
//!
//! One tick at a time: wait for the tick source, run the controller,
//! publish the output if the throttle allows. Transport commands are
//! handled between ticks, so they never interleave with a tick.

use std::sync::Arc;

use contracts::{MediaSource, SyncMode, TickConfig, TickOutput, TickSource};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use warp_mapper::WarpMapping;

use crate::controller::SyncController;
use crate::throttle::PublishThrottle;
use crate::transport::{pause_both, play_both, reset_both};

/// Commands accepted by a running loop
#[derive(Debug, Clone)]
pub enum SyncCommand {
    /// Wait for both streams, align, then play
    Play,
    /// Pause both, snap follower onto the mapped target
    Pause,
    /// Pause and rewind both to 0
    Reset,
    /// Replace the warp mapping
    SetWarp(Option<Arc<WarpMapping>>),
    /// Switch between free-run and alignment
    SetMode(SyncMode),
}

/// Why the loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Cancellation flag set (or its sender dropped)
    Cancelled,
    /// Tick source ended
    TicksExhausted,
    /// Output receiver dropped
    OutputClosed,
}

/// Loop result: the owned parts handed back plus counters
#[derive(Debug)]
pub struct SyncLoopOutcome<R, F> {
    pub controller: SyncController,
    pub reference: R,
    pub follower: F,
    pub ticks: u64,
    pub published: u64,
    pub reason: StopReason,
}

/// Async sync loop
pub struct SyncLoop<R, F, T> {
    controller: SyncController,
    reference: R,
    follower: F,
    ticks: T,
    throttle: PublishThrottle,
    commands: Option<mpsc::Receiver<SyncCommand>>,
}

impl<R, F, T> SyncLoop<R, F, T>
where
    R: MediaSource,
    F: MediaSource,
    T: TickSource,
{
    pub fn new(
        controller: SyncController,
        reference: R,
        follower: F,
        ticks: T,
        config: &TickConfig,
    ) -> Self {
        Self {
            controller,
            reference,
            follower,
            ticks,
            throttle: PublishThrottle::new(config.publish_hz),
            commands: None,
        }
    }

    /// Accept transport commands while running
    pub fn with_commands(mut self, commands: mpsc::Receiver<SyncCommand>) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Run until cancelled, the tick source ends, or `outputs` closes.
    #[instrument(name = "sync_loop", skip_all, fields(source = self.ticks.name()))]
    pub async fn run(
        self,
        outputs: mpsc::Sender<TickOutput>,
        mut cancel: watch::Receiver<bool>,
    ) -> SyncLoopOutcome<R, F> {
        let Self {
            mut controller,
            mut reference,
            mut follower,
            mut ticks,
            mut throttle,
            mut commands,
        } = self;

        let mut tick_count: u64 = 0;
        let mut published: u64 = 0;

        info!(
            reference = reference.identity(),
            follower = follower.identity(),
            "sync loop started"
        );

        let reason = loop {
            tokio::select! {
                biased;

                _ = cancelled(&mut cancel) => break StopReason::Cancelled,

                command = next_command(&mut commands) => {
                    let Some(command) = command else {
                        debug!("command channel closed");
                        commands = None;
                        continue;
                    };
                    debug!(?command, "sync command");
                    match command {
                        SyncCommand::Play => {
                            tokio::select! {
                                biased;
                                _ = cancelled(&mut cancel) => break StopReason::Cancelled,
                                result = play_both(&mut controller, &mut reference, &mut follower) => {
                                    if let Err(e) = result {
                                        warn!(error = %e, "play failed");
                                    }
                                }
                            }
                        }
                        SyncCommand::Pause => pause_both(&controller, &mut reference, &mut follower),
                        SyncCommand::Reset => {
                            reset_both(&mut controller, &mut reference, &mut follower);
                            throttle.reset();
                        }
                        SyncCommand::SetWarp(mapping) => controller.set_warp(mapping),
                        SyncCommand::SetMode(mode) => controller.set_mode(mode),
                    }
                }

                tick = ticks.next_tick() => {
                    if tick.is_none() {
                        break StopReason::TicksExhausted;
                    }
                    let output = controller.tick(&mut reference, &mut follower);
                    tick_count += 1;

                    if throttle.ready(Instant::now()) {
                        // a full channel must not block cancellation
                        tokio::select! {
                            biased;
                            _ = cancelled(&mut cancel) => break StopReason::Cancelled,
                            sent = outputs.send(output) => {
                                if sent.is_err() {
                                    break StopReason::OutputClosed;
                                }
                                published += 1;
                                metrics::counter!("lapgap_published_total").increment(1);
                            }
                        }
                    }
                }
            }
        };

        info!(ticks = tick_count, published, ?reason, "sync loop stopped");

        SyncLoopOutcome {
            controller,
            reference,
            follower,
            ticks: tick_count,
            published,
            reason,
        }
    }
}

/// Resolves once the stop flag is set or its sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|stop| *stop).await;
}

async fn next_command(commands: &mut Option<mpsc::Receiver<SyncCommand>>) -> Option<SyncCommand> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
