//! Playback control methods
//!
//! A play request passes the loading gate on the caller's task, then runs on
//! its own task: resolve the stream URL, hand it to the engine, mark the
//! track as playing. The loading flag is released once, after the request
//! body has finished or panicked.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::error::{PortError, bounded};
use crate::model::{NowPlaying, PlaybackPhase, QueueEntry, Track};
use crate::player::PauseOutcome;

use super::AppController;

const VOLUME_STEP: f64 = 5.0;

#[derive(Debug, thiserror::Error)]
enum PlayFailure {
    #[error("shutting down")]
    Cancelled,
    #[error("server returned no stream URL")]
    EmptyUrl,
    #[error("could not resolve stream: {0}")]
    Resolve(PortError),
    #[error("player rejected stream: {0}")]
    Engine(PortError),
}

impl AppController {
    /// Start playing the listing entry at `index`.
    ///
    /// Out-of-range indexes and requests made while another track is loading
    /// are dropped silently. Returns the handle of the spawned request.
    pub async fn play_song_at_index(&self, index: usize) -> Option<JoinHandle<()>> {
        let Some(track) = self.model.track_at(index).await else {
            tracing::debug!(index, "Ignoring play request outside the listing");
            return None;
        };

        if !self
            .model
            .player_state()
            .try_begin_load(track.clone(), index)
            .await
        {
            tracing::debug!(index, "Ignoring play request while another track is loading");
            return None;
        }

        tracing::info!(index, title = %track.title, "Loading track");
        self.model
            .set_now_playing(NowPlaying::with_track(
                PlaybackPhase::Loading,
                track.clone(),
                index,
            ))
            .await;
        self.model.set_progress(None).await;

        let controller = self.clone();
        Some(tokio::spawn(async move {
            controller.run_play_request(track, index).await;
        }))
    }

    pub async fn play_next(&self) -> Option<JoinHandle<()>> {
        let len = self.model.listing_len().await;
        let state = self.model.player_state().get_state().await;
        if len == 0 || state.is_loading {
            return None;
        }

        let next = match state.index() {
            Some(current) => (current + 1) % len,
            None => 0,
        };
        tracing::debug!(from = ?state.index(), to = next, "Next track");
        self.play_song_at_index(next).await
    }

    pub async fn play_previous(&self) -> Option<JoinHandle<()>> {
        let len = self.model.listing_len().await;
        let state = self.model.player_state().get_state().await;
        if len == 0 || state.is_loading {
            return None;
        }

        let previous = match state.index() {
            Some(current) => (current % len + len - 1) % len,
            None => len - 1,
        };
        tracing::debug!(from = ?state.index(), to = previous, "Previous track");
        self.play_song_at_index(previous).await
    }

    pub async fn toggle_pause(&self) {
        let state = self.model.player_state().get_state().await;
        if state.is_loading {
            return;
        }
        let Some((index, track)) = state.current else {
            return;
        };

        let limit = self.timings().command_timeout;
        // An idle engine restarts the current track, never its oldest queue entry
        if let Ok(false) = bounded(limit, self.player.is_song_loaded()).await {
            tracing::info!(index, title = %track.title, "Engine idle, restarting current track");
            self.play_song_at_index(index).await;
            return;
        }

        let outcome = match bounded(limit, self.player.pause()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Pause toggle failed");
                self.model.set_error(Self::format_error(&e)).await;
                return;
            }
        };
        let paused = bounded(limit, self.player.is_paused())
            .await
            .unwrap_or(outcome == PauseOutcome::Paused);
        let playing = outcome != PauseOutcome::Stopped && !paused;

        let now = self.model.player_state().get_state().await;
        if now.is_loading || now.index() != Some(index) {
            return;
        }

        if outcome == PauseOutcome::Stopped {
            // The engine went idle and has nothing queued to resume
            tracing::info!(index, "Nothing to resume, clearing current track");
            let state = self.model.player_state();
            state.set_playing(false).await;
            state.clear_current_song().await;
            self.model.set_progress(None).await;
            self.model.set_now_playing(NowPlaying::idle()).await;
            return;
        }

        self.model.player_state().set_playing(playing).await;
        let phase = if playing {
            PlaybackPhase::Playing
        } else {
            PlaybackPhase::Paused
        };
        self.model
            .set_now_playing(NowPlaying::with_track(phase, track, index))
            .await;
        tracing::info!(?outcome, playing, "Pause toggled");
    }

    pub async fn volume_up(&self) {
        self.change_volume(VOLUME_STEP).await;
    }

    pub async fn volume_down(&self) {
        self.change_volume(-VOLUME_STEP).await;
    }

    async fn change_volume(&self, delta: f64) {
        let limit = self.timings().command_timeout;
        let result = async {
            let current = bounded(limit, self.player.get_volume()).await?;
            let target = (current + delta).clamp(0.0, 100.0);
            bounded(limit, self.player.set_volume(target)).await?;
            Ok::<_, PortError>(target)
        }
        .await;

        match result {
            Ok(volume) => {
                tracing::debug!(volume, "Volume changed");
                self.model
                    .set_status_message(format!("Volume: {volume:.0}%"))
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Volume change failed");
                self.model
                    .set_error(format!("Volume change failed: {}", Self::format_error(&e)))
                    .await;
            }
        }
    }

    async fn run_play_request(&self, track: Track, index: usize) {
        let outcome = AssertUnwindSafe(self.load_and_play(&track, index))
            .catch_unwind()
            .await;

        let state = self.model.player_state();
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(PlayFailure::Cancelled)) => {
                tracing::debug!(index, "Play request discarded after cancellation");
            }
            Ok(Err(failure)) => {
                tracing::warn!(index, title = %track.title, reason = %failure, "Playback failed");
                state.set_playing(false).await;
                self.model
                    .set_now_playing(NowPlaying::failed(
                        Some(track),
                        Some(index),
                        failure.to_string(),
                    ))
                    .await;
            }
            Err(_) => {
                tracing::error!(index, title = %track.title, "Play request panicked");
                state.set_playing(false).await;
                self.model
                    .set_now_playing(NowPlaying::failed(Some(track), Some(index), "internal error"))
                    .await;
            }
        }

        state.set_loading(false).await;
    }

    async fn load_and_play(&self, track: &Track, index: usize) -> Result<(), PlayFailure> {
        let timings = self.timings();

        let url = bounded(timings.resolve_timeout, self.library.get_play_url(&track.id))
            .await
            .map_err(PlayFailure::Resolve)?;
        if url.is_empty() {
            return Err(PlayFailure::EmptyUrl);
        }
        if self.cancel.is_cancelled() {
            return Err(PlayFailure::Cancelled);
        }

        if let Err(e) = bounded(timings.command_timeout, self.player.play(&url)).await {
            if e.is_timeout() {
                // A late start must not play while the state says stopped.
                if let Err(stop_err) = bounded(timings.command_timeout, self.player.stop()).await {
                    tracing::debug!(error = %stop_err, "Stop after play timeout failed");
                }
            }
            return Err(PlayFailure::Engine(e));
        }

        self.player
            .add_to_queue(QueueEntry::from_track(track, url))
            .await;
        if self.cancel.is_cancelled() {
            return Err(PlayFailure::Cancelled);
        }

        self.model.player_state().set_playing(true).await;
        self.model
            .set_now_playing(NowPlaying::with_track(
                PlaybackPhase::Playing,
                track.clone(),
                index,
            ))
            .await;
        tracing::info!(index, title = %track.title, artist = %track.artist, "Playback started");

        if let Some(cover_art) = &track.cover_art {
            match self.library.get_cover_art_url(cover_art) {
                Ok(url) => tracing::debug!(cover_art_url = %url, "Cover art available"),
                Err(e) => tracing::debug!(error = %e, "No cover art URL"),
            }
        }

        tokio::time::sleep(timings.post_play_hold).await;
        Ok(())
    }
}
