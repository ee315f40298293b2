//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and the ports, and manages playback.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `keymap`: Key bindings, including the `gg` sequence
//! - `playback`: Play requests, next/previous, pause and volume
//! - `navigation`: Loading, search, insert-next and pagination
//! - `player_events`: Engine event bridge
//! - `progress`: Periodic progress sampler

mod input;
mod keymap;
mod playback;
mod navigation;
mod player_events;
mod progress;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{PortError, bounded};
use crate::library::LibraryPort;
use crate::model::{AppModel, Track};
use crate::player::PlayerPort;

pub use keymap::Command;
use keymap::KeyMap;

/// Deadlines and cadences used by playback orchestration.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackTimings {
    /// Stream URL resolution
    pub resolve_timeout: Duration,
    /// Engine commands such as play, pause and volume
    pub command_timeout: Duration,
    /// Engine property reads made by the progress sampler
    pub query_timeout: Duration,
    pub sample_interval: Duration,
    /// Pause after a successful start before the loading gate reopens
    pub post_play_hold: Duration,
}

impl Default for PlaybackTimings {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(2),
            query_timeout: Duration::from_millis(200),
            sample_interval: Duration::from_secs(1),
            post_play_hold: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ControllerSettings {
    pub timings: PlaybackTimings,
    pub search_limit: usize,
    /// `load_music` fetches `page_size * load_pages` random songs
    pub load_pages: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            timings: PlaybackTimings::default(),
            search_limit: 100,
            load_pages: 10,
        }
    }
}

/// Results of background fetches, applied on the UI loop.
#[derive(Debug)]
pub enum UiUpdate {
    MusicLoaded(Vec<Track>),
    SearchCompleted { query: String, songs: Vec<Track> },
    Error(String),
}

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: AppModel,
    pub(crate) library: Arc<dyn LibraryPort>,
    pub(crate) player: Arc<dyn PlayerPort>,
    pub(crate) settings: ControllerSettings,
    pub(crate) cancel: CancellationToken,
    updates: mpsc::UnboundedSender<UiUpdate>,
    keymap: Arc<Mutex<KeyMap>>,
}

impl AppController {
    /// Returns the controller and the receiving end of its UI update channel,
    /// which the UI loop drains with [`AppController::apply_ui_update`].
    pub fn new(
        model: AppModel,
        library: Arc<dyn LibraryPort>,
        player: Arc<dyn PlayerPort>,
        settings: ControllerSettings,
        cancel: CancellationToken,
    ) -> (Self, mpsc::UnboundedReceiver<UiUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let controller = Self {
            model,
            library,
            player,
            settings,
            cancel,
            updates,
            keymap: Arc::new(Mutex::new(KeyMap::new())),
        };
        (controller, rx)
    }

    pub(crate) fn timings(&self) -> PlaybackTimings {
        self.settings.timings
    }

    pub(crate) fn send_update(&self, update: UiUpdate) {
        if self.updates.send(update).is_err() {
            tracing::debug!("UI update dropped, UI loop has exited");
        }
    }

    pub(crate) fn format_error(error: &PortError) -> String {
        match error {
            PortError::Timeout(_) => "Server did not respond in time".to_string(),
            PortError::Http(e) if e.is_connect() => "Cannot reach the music server".to_string(),
            PortError::Api { code: 40, .. } => {
                "Authentication failed. Check username and password.".to_string()
            }
            PortError::Api { message, .. } => format!("Server error: {message}"),
            PortError::Unavailable(what) => format!("{what} is not running"),
            other => format!("Error: {other}"),
        }
    }

    /// Cancel background work, wait briefly for `tasks`, stop audible
    /// playback and release the engine. Runs the engine cleanup exactly once.
    pub async fn shutdown(&self, tasks: Vec<JoinHandle<()>>) {
        tracing::info!(tasks = tasks.len(), "Shutting down");
        self.cancel.cancel();

        let limit = self.timings().command_timeout;
        for task in tasks {
            if tokio::time::timeout(limit, task).await.is_err() {
                tracing::warn!("Background task did not stop in time");
            }
        }

        // A stalled engine must not keep cleanup from running
        let playing = bounded(limit, async { Ok::<_, PortError>(self.player.is_playing().await) })
            .await
            .unwrap_or(false);
        if playing {
            if let Err(e) = bounded(limit, self.player.stop()).await {
                tracing::warn!(error = %e, "Stop on shutdown failed");
            }
        }
        self.player.cleanup().await;
    }
}
