//! Coordinated transport of the stream pair.
//!
//! Play waits for both decoders, lines the follower up with the mapped
//! reference position and starts both. Pause snaps the follower back onto
//! the mapped reference position so no soft-sync drift survives a pause.

use contracts::{ContractError, MediaSource};
use tracing::{debug, info, instrument};

use crate::controller::SyncController;

/// Wait until `media` reports it can play. No timeout.
pub async fn wait_until_ready<M>(media: &M) -> Result<(), ContractError>
where
    M: MediaSource + ?Sized,
{
    let mut readiness = media.readiness();
    readiness
        .wait_for(|state| state.can_play())
        .await
        .map(|_| ())
        .map_err(|_| ContractError::media_unavailable(media.identity(), "readiness channel closed"))
}

/// Start both streams from aligned positions.
///
/// The follower lands on `map_a_to_b(reference)`, which is the raw
/// reference position only when no warp mapping is installed.
#[instrument(name = "transport_play_both", skip_all)]
pub async fn play_both<R, F>(
    controller: &mut SyncController,
    reference: &mut R,
    follower: &mut F,
) -> Result<(), ContractError>
where
    R: MediaSource + ?Sized,
    F: MediaSource + ?Sized,
{
    tokio::try_join!(wait_until_ready(&*reference), wait_until_ready(&*follower))?;

    let t_ref = reference.position();
    let target = controller.target_for(t_ref);
    follower.seek(target);
    follower.set_rate(1.0);
    // frame-accurate re-snap once both are actually running
    controller.request_snap();

    reference.play();
    follower.play();

    info!(t_ref, target, "playback started");
    Ok(())
}

/// Pause both streams and snap the follower onto the reference.
///
/// With a warp installed the snap target is the mapped position, not the
/// raw reference time; snapping to the raw time would undo the mapping.
pub fn pause_both<R, F>(controller: &SyncController, reference: &mut R, follower: &mut F)
where
    R: MediaSource + ?Sized,
    F: MediaSource + ?Sized,
{
    reference.pause();
    follower.pause();

    let t_ref = reference.position();
    follower.seek(controller.target_for(t_ref));
    follower.set_rate(1.0);
    debug!(t_ref, "playback paused");
}

/// Pause, rewind both streams to 0 and clear the controller state.
pub fn reset_both<R, F>(controller: &mut SyncController, reference: &mut R, follower: &mut F)
where
    R: MediaSource + ?Sized,
    F: MediaSource + ?Sized,
{
    pause_both(controller, reference, follower);
    reference.seek(0.0);
    follower.seek(0.0);
    controller.reset_state();
    debug!("playback reset");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{AnchorPair, ReadyState};
    use playback::{SimulatedMedia, SimulatedMediaConfig};
    use warp_mapper::WarpMapping;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_play_waits_for_readiness() {
        let mut reference = SimulatedMedia::with_duration("a.mp4", 30.0);
        let mut follower = SimulatedMedia::new(SimulatedMediaConfig {
            identity: "b.mp4".to_string(),
            duration: 30.0,
            ready_state: ReadyState::Metadata,
            ..Default::default()
        });
        let handle = follower.readiness_handle();
        let mut controller = SyncController::default();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            handle.set(ReadyState::FutureData);
        });

        play_both(&mut controller, &mut reference, &mut follower)
            .await
            .unwrap();
        assert!(reference.is_playing());
        assert!(follower.is_playing());
        assert_eq!(follower.rate(), 1.0);
    }

    #[tokio::test]
    async fn test_play_aligns_follower_to_mapped_target() {
        let mut reference = SimulatedMedia::with_duration("a.mp4", 30.0);
        let mut follower = SimulatedMedia::with_duration("b.mp4", 30.0);
        reference.seek(15.0);
        follower.set_rate(1.05);

        let mut controller = SyncController::default();
        let mapping = WarpMapping::build(&[
            AnchorPair::new(0.0, 0.0),
            AnchorPair::new(10.0, 8.0),
            AnchorPair::new(20.0, 20.0),
        ])
        .unwrap();
        controller.set_warp(Some(Arc::new(mapping)));

        play_both(&mut controller, &mut reference, &mut follower)
            .await
            .unwrap();
        assert!((follower.position() - 14.0).abs() < 0.05);
        assert_eq!(follower.rate(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_snaps_follower() {
        let mut reference = SimulatedMedia::with_duration("a.mp4", 30.0);
        let mut follower = SimulatedMedia::with_duration("b.mp4", 30.0);
        let controller = SyncController::default();
        reference.play();
        follower.play();
        follower.set_rate(1.08);
        tokio::time::advance(Duration::from_secs(2)).await;

        pause_both(&controller, &mut reference, &mut follower);
        assert!(!reference.is_playing());
        assert!(!follower.is_playing());
        assert_eq!(follower.position(), reference.position());
        assert_eq!(follower.rate(), 1.0);
    }

    #[test]
    fn test_pause_with_warp_snaps_to_mapped_position() {
        let mut reference = SimulatedMedia::with_duration("a.mp4", 30.0);
        let mut follower = SimulatedMedia::with_duration("b.mp4", 30.0);
        reference.seek(5.0);
        follower.seek(5.0);

        let mut controller = SyncController::default();
        let mapping = WarpMapping::build(&[AnchorPair::new(0.0, 0.0), AnchorPair::new(10.0, 8.0)]).unwrap();
        controller.set_warp(Some(Arc::new(mapping)));

        pause_both(&controller, &mut reference, &mut follower);
        assert!((follower.position() - 4.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_rewinds_both() {
        let mut reference = SimulatedMedia::with_duration("a.mp4", 30.0);
        let mut follower = SimulatedMedia::with_duration("b.mp4", 30.0);
        let mut controller = SyncController::default();
        reference.play();
        follower.play();
        tokio::time::advance(Duration::from_secs(3)).await;
        controller.tick(&mut reference, &mut follower);

        reset_both(&mut controller, &mut reference, &mut follower);
        assert_eq!(reference.position(), 0.0);
        assert_eq!(follower.position(), 0.0);

        follower.seek(1.0);
        let out = controller.tick(&mut reference, &mut follower);
        assert_eq!(out.smoothed_delta, out.raw_delta);
    }
}
