//! Scripted ports and builders shared by controller tests

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::controller::{AppController, ControllerSettings, PlaybackTimings, UiUpdate};
use crate::error::PortError;
use crate::library::LibraryPort;
use crate::model::{AppModel, QueueEntry, Track};
use crate::player::{PauseOutcome, PlayerEvent, PlayerPort};

pub fn tracks(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| Track {
            id: format!("t{i}"),
            title: format!("Track {i}"),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration: 180,
            ..Default::default()
        })
        .collect()
}

pub fn fast_timings() -> PlaybackTimings {
    PlaybackTimings {
        resolve_timeout: Duration::from_millis(100),
        command_timeout: Duration::from_millis(100),
        query_timeout: Duration::from_millis(50),
        sample_interval: Duration::from_millis(20),
        post_play_hold: Duration::from_millis(10),
    }
}

/// Library that serves a fixed song list and builds `fake://` stream URLs.
pub struct FakeLibrary {
    pub songs: Vec<Track>,
    pub search_results: Vec<Track>,
    pub search_fails: bool,
    pub url_delay: Duration,
    pub empty_url: bool,
    pub panic_on_resolve: bool,
    pub resolved: Mutex<Vec<String>>,
}

impl FakeLibrary {
    pub fn new(songs: Vec<Track>) -> Self {
        Self {
            songs,
            search_results: Vec::new(),
            search_fails: false,
            url_delay: Duration::ZERO,
            empty_url: false,
            panic_on_resolve: false,
            resolved: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LibraryPort for FakeLibrary {
    async fn get_random_songs(&self, count: usize) -> Result<Vec<Track>, PortError> {
        Ok(self.songs.iter().take(count).cloned().collect())
    }

    async fn search_songs(&self, _query: &str, limit: usize) -> Result<Vec<Track>, PortError> {
        if self.search_fails {
            return Err(PortError::Unavailable("search"));
        }
        Ok(self.search_results.iter().take(limit).cloned().collect())
    }

    async fn get_play_url(&self, track_id: &str) -> Result<String, PortError> {
        if self.panic_on_resolve {
            panic!("resolver exploded");
        }
        tokio::time::sleep(self.url_delay).await;
        self.resolved.lock().unwrap().push(track_id.to_string());
        if self.empty_url {
            return Ok(String::new());
        }
        Ok(format!("fake://{track_id}"))
    }

    fn get_cover_art_url(&self, cover_art_id: &str) -> Result<String, PortError> {
        Ok(format!("fake://cover/{cover_art_id}"))
    }

    async fn ping(&self) -> Result<(), PortError> {
        Ok(())
    }
}

/// Player that records commands and answers queries from its fields.
pub struct FakePlayer {
    pub played: Mutex<Vec<String>>,
    pub stops: AtomicUsize,
    pub cleanups: AtomicUsize,
    pub queue: Mutex<Vec<QueueEntry>>,
    /// `None` makes `get_progress` fail
    pub progress: Mutex<Option<(f64, f64)>>,
    pub query_delay: Duration,
    pub play_delay: Duration,
    /// Applied to `is_playing`
    pub status_delay: Duration,
    pub volume_delay: Duration,
    pub volume: Mutex<f64>,
    pub paused: Mutex<bool>,
    pub loaded: Mutex<bool>,
    events: Mutex<Option<mpsc::UnboundedReceiver<PlayerEvent>>>,
    pub event_tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl FakePlayer {
    pub fn new() -> Self {
        let (event_tx, events) = mpsc::unbounded_channel();
        Self {
            played: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            cleanups: AtomicUsize::new(0),
            queue: Mutex::new(Vec::new()),
            progress: Mutex::new(Some((30.0, 180.0))),
            query_delay: Duration::ZERO,
            play_delay: Duration::ZERO,
            status_delay: Duration::ZERO,
            volume_delay: Duration::ZERO,
            volume: Mutex::new(50.0),
            paused: Mutex::new(false),
            loaded: Mutex::new(false),
            events: Mutex::new(Some(events)),
            event_tx,
        }
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlayerPort for FakePlayer {
    async fn play(&self, url: &str) -> Result<(), PortError> {
        tokio::time::sleep(self.play_delay).await;
        self.played.lock().unwrap().push(url.to_string());
        *self.loaded.lock().unwrap() = true;
        *self.paused.lock().unwrap() = false;
        Ok(())
    }

    async fn pause(&self) -> Result<PauseOutcome, PortError> {
        if !*self.loaded.lock().unwrap() {
            return Ok(PauseOutcome::Stopped);
        }
        let mut paused = self.paused.lock().unwrap();
        *paused = !*paused;
        Ok(if *paused {
            PauseOutcome::Paused
        } else {
            PauseOutcome::Playing
        })
    }

    async fn stop(&self) -> Result<(), PortError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        *self.loaded.lock().unwrap() = false;
        Ok(())
    }

    async fn get_progress(&self) -> Result<(f64, f64), PortError> {
        tokio::time::sleep(self.query_delay).await;
        let progress = *self.progress.lock().unwrap();
        progress.ok_or(PortError::Engine("property unavailable".into()))
    }

    async fn get_volume(&self) -> Result<f64, PortError> {
        tokio::time::sleep(self.volume_delay).await;
        Ok(*self.volume.lock().unwrap())
    }

    async fn set_volume(&self, volume: f64) -> Result<(), PortError> {
        *self.volume.lock().unwrap() = volume;
        Ok(())
    }

    async fn is_playing(&self) -> bool {
        tokio::time::sleep(self.status_delay).await;
        *self.loaded.lock().unwrap() && !*self.paused.lock().unwrap()
    }

    async fn is_paused(&self) -> Result<bool, PortError> {
        Ok(*self.paused.lock().unwrap())
    }

    async fn is_song_loaded(&self) -> Result<bool, PortError> {
        Ok(*self.loaded.lock().unwrap())
    }

    async fn add_to_queue(&self, entry: QueueEntry) {
        self.queue.lock().unwrap().push(entry);
    }

    async fn get_queue(&self) -> Vec<QueueEntry> {
        self.queue.lock().unwrap().clone()
    }

    async fn clear_queue(&self) {
        self.queue.lock().unwrap().clear();
    }

    async fn event_channel(&self) -> Option<mpsc::UnboundedReceiver<PlayerEvent>> {
        self.events.lock().unwrap().take()
    }

    async fn cleanup(&self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub controller: AppController,
    pub model: AppModel,
    pub library: Arc<FakeLibrary>,
    pub player: Arc<FakePlayer>,
    pub cancel: CancellationToken,
    pub updates: mpsc::UnboundedReceiver<UiUpdate>,
}

impl Harness {
    /// Controller over the given fakes with the listing pre-filled from
    /// `library.songs`.
    pub async fn new(library: FakeLibrary, player: FakePlayer) -> Self {
        let model = AppModel::new(20);
        model.replace_songs(library.songs.clone()).await;

        let library = Arc::new(library);
        let player = Arc::new(player);
        let cancel = CancellationToken::new();
        let settings = ControllerSettings {
            timings: fast_timings(),
            ..Default::default()
        };
        let (controller, updates) = AppController::new(
            model.clone(),
            library.clone(),
            player.clone(),
            settings,
            cancel.clone(),
        );

        Self {
            controller,
            model,
            library,
            player,
            cancel,
            updates,
        }
    }

    pub async fn with_tracks(n: usize) -> Self {
        Self::new(FakeLibrary::new(tracks(n)), FakePlayer::new()).await
    }

    /// Apply every pending background result, as the UI loop would.
    pub async fn drain_updates(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.controller.apply_ui_update(update).await;
        }
    }
}
