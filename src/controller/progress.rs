//! Periodic progress sampler
//!
//! Once per tick the sampler reads the player state, queries the engine for
//! position, duration and volume under short deadlines, and publishes a
//! progress snapshot plus the matching status projection. Queries run inline
//! on the sampler task, so a slow engine delays the next tick instead of
//! piling up requests.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::bounded;
use crate::model::{NowPlaying, PlaybackPhase, ProgressSnapshot};

use super::AppController;

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SampleOutcome {
    /// A play request owns the state
    SkippedLoading,
    Idle,
    Paused,
    Playing,
    /// Engine query timed out, failed or returned nonsense
    Dropped,
}

impl AppController {
    pub fn start_progress_sampler(&self) -> JoinHandle<()> {
        let controller = self.clone();
        let period = self.timings().sample_interval;
        tracing::info!(period_ms = period.as_millis() as u64, "Starting progress sampler");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = controller.cancel.cancelled() => {
                        tracing::debug!("Progress sampler cancelled");
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                let sampled = AssertUnwindSafe(controller.sample_progress())
                    .catch_unwind()
                    .await;
                match sampled {
                    Ok(outcome) => tracing::trace!(?outcome, "Progress tick"),
                    Err(_) => tracing::error!("Progress sample panicked"),
                }
            }
        })
    }

    pub(crate) async fn sample_progress(&self) -> SampleOutcome {
        let state = self.model.player_state().get_state().await;
        if state.is_loading {
            return SampleOutcome::SkippedLoading;
        }
        let limit = self.timings().query_timeout;

        let Some((index, track)) = state.current else {
            self.model.set_progress(None).await;
            return SampleOutcome::Idle;
        };

        if !state.is_playing {
            let (position, duration) = match bounded(limit, self.player.get_progress()).await {
                Ok((position, duration)) if duration > 0.0 && position >= 0.0 => (position, duration),
                _ => (0.0, track.duration as f64),
            };
            let volume = bounded(limit, self.player.get_volume()).await.ok();

            if !self.still_current(index, false).await {
                return SampleOutcome::Dropped;
            }
            self.model
                .set_progress(Some(ProgressSnapshot {
                    position,
                    duration,
                    volume,
                    paused: true,
                }))
                .await;

            // A failure stays on screen until something new happens.
            if self.model.get_now_playing().await.phase != PlaybackPhase::Failed {
                self.model
                    .set_now_playing(NowPlaying::with_track(PlaybackPhase::Paused, track, index))
                    .await;
            }
            return SampleOutcome::Paused;
        }

        let (position, duration) = match bounded(limit, self.player.get_progress()).await {
            Ok(progress) => progress,
            Err(e) => {
                tracing::trace!(error = %e, "Progress query failed, dropping tick");
                return SampleOutcome::Dropped;
            }
        };
        if duration.is_nan() || duration <= 0.0 || position.is_nan() || position < 0.0 {
            return SampleOutcome::Dropped;
        }
        let volume = match bounded(limit, self.player.get_volume()).await {
            Ok(volume) => volume,
            Err(e) => {
                tracing::trace!(error = %e, "Volume query failed, dropping tick");
                return SampleOutcome::Dropped;
            }
        };

        if !self.still_current(index, true).await {
            return SampleOutcome::Dropped;
        }
        self.model
            .set_progress(Some(ProgressSnapshot {
                position,
                duration,
                volume: Some(volume),
                paused: false,
            }))
            .await;
        self.model
            .set_now_playing(NowPlaying::with_track(PlaybackPhase::Playing, track, index))
            .await;
        SampleOutcome::Playing
    }

    /// Whether the state read at the start of the tick still holds, so a
    /// sample never overwrites the status of a newer request.
    async fn still_current(&self, index: usize, playing: bool) -> bool {
        let now = self.model.player_state().get_state().await;
        !now.is_loading && now.index() == Some(index) && now.is_playing == playing
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::SampleOutcome;
    use crate::model::PlaybackPhase;
    use crate::test_support::{FakeLibrary, FakePlayer, Harness, tracks};

    #[tokio::test]
    async fn idle_without_track() {
        let h = Harness::with_tracks(2).await;
        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Idle);
        assert!(h.model.get_progress().await.is_none());
    }

    #[tokio::test]
    async fn skips_while_loading() {
        let mut library = FakeLibrary::new(tracks(1));
        library.url_delay = Duration::from_millis(50);
        let h = Harness::new(library, FakePlayer::new()).await;

        let handle = h.controller.play_song_at_index(0).await.unwrap();
        assert_eq!(
            h.controller.sample_progress().await,
            SampleOutcome::SkippedLoading
        );
        assert_eq!(h.model.get_now_playing().await.phase, PlaybackPhase::Loading);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn playing_sample_publishes_progress() {
        let h = Harness::with_tracks(1).await;
        h.controller.play_song_at_index(0).await.unwrap().await.unwrap();

        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Playing);
        let progress = h.model.get_progress().await.unwrap();
        assert_eq!(progress.time_text(), "00:30/03:00");
        assert_eq!(progress.volume_text(), "50%");
        assert!(!progress.paused);
    }

    #[tokio::test]
    async fn invalid_or_slow_queries_drop_the_tick() {
        let h = Harness::with_tracks(1).await;
        h.controller.play_song_at_index(0).await.unwrap().await.unwrap();

        *h.player.progress.lock().unwrap() = Some((10.0, 0.0));
        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Dropped);

        *h.player.progress.lock().unwrap() = Some((-1.0, 100.0));
        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Dropped);

        *h.player.progress.lock().unwrap() = None;
        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Dropped);
        assert!(h.model.get_progress().await.is_none());
    }

    #[tokio::test]
    async fn slow_engine_query_is_bounded() {
        let mut player = FakePlayer::new();
        player.query_delay = Duration::from_millis(300);
        let h = Harness::new(FakeLibrary::new(tracks(1)), player).await;
        h.model.player_state().set_current_song(tracks(1).remove(0), 0).await;
        h.model.player_state().set_playing(true).await;

        let started = std::time::Instant::now();
        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Dropped);
        assert!(started.elapsed() < Duration::from_millis(250));
    }

    #[tokio::test]
    async fn slow_volume_query_drops_playing_tick() {
        let mut player = FakePlayer::new();
        player.volume_delay = Duration::from_millis(200);
        let h = Harness::new(FakeLibrary::new(tracks(1)), player).await;
        h.controller.play_song_at_index(0).await.unwrap().await.unwrap();
        h.model.set_progress(None).await;

        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Dropped);
        assert!(h.model.get_progress().await.is_none());
    }

    #[tokio::test]
    async fn paused_degrades_to_track_duration() {
        let h = Harness::with_tracks(1).await;
        h.controller.play_song_at_index(0).await.unwrap().await.unwrap();
        h.controller.toggle_pause().await;
        *h.player.progress.lock().unwrap() = None;

        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Paused);
        let progress = h.model.get_progress().await.unwrap();
        assert!(progress.paused);
        assert_eq!(progress.time_text(), "00:00/03:00");
        assert_eq!(h.model.get_now_playing().await.phase, PlaybackPhase::Paused);
    }

    #[tokio::test]
    async fn failure_status_survives_paused_ticks() {
        let mut library = FakeLibrary::new(tracks(1));
        library.empty_url = true;
        let h = Harness::new(library, FakePlayer::new()).await;
        h.controller.play_song_at_index(0).await.unwrap().await.unwrap();

        assert_eq!(h.controller.sample_progress().await, SampleOutcome::Paused);
        assert_eq!(h.model.get_now_playing().await.phase, PlaybackPhase::Failed);
    }

    #[tokio::test]
    async fn sampler_task_stops_on_cancellation() {
        let h = Harness::with_tracks(1).await;
        let sampler = h.controller.start_progress_sampler();
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), sampler)
            .await
            .expect("sampler should stop")
            .unwrap();
    }
}
