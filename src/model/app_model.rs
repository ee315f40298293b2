//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

use super::listing::{Listing, ListingView};
use super::player_state::PlayerState;
use super::status::{NowPlaying, ProgressSnapshot};
use super::track::{QueueEntry, Track};
use super::types::{Focus, Overlay, UiState};

const ERROR_TTL_SECS: u64 = 5;

/// Main application model containing all state.
///
/// Cheap to clone; every clone shares the same state. The listing is only
/// mutated from the UI loop, background tasks copy out what they need.
#[derive(Clone)]
pub struct AppModel {
    player_state: PlayerState,
    listing: Arc<RwLock<Listing>>,
    now_playing: Arc<Mutex<NowPlaying>>,
    progress: Arc<Mutex<Option<ProgressSnapshot>>>,
    ui_state: Arc<Mutex<UiState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(page_size: usize) -> Self {
        Self {
            player_state: PlayerState::new(),
            listing: Arc::new(RwLock::new(Listing::new(page_size))),
            now_playing: Arc::new(Mutex::new(NowPlaying::idle())),
            progress: Arc::new(Mutex::new(None)),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn player_state(&self) -> &PlayerState {
        &self.player_state
    }

    // ========================================================================
    // Status projections
    // ========================================================================

    pub async fn get_now_playing(&self) -> NowPlaying {
        self.now_playing.lock().await.clone()
    }

    pub async fn set_now_playing(&self, status: NowPlaying) {
        *self.now_playing.lock().await = status;
    }

    pub async fn get_progress(&self) -> Option<ProgressSnapshot> {
        self.progress.lock().await.clone()
    }

    pub async fn set_progress(&self, progress: Option<ProgressSnapshot>) {
        *self.progress.lock().await = progress;
    }

    // ========================================================================
    // Listing
    // ========================================================================

    pub async fn listing_len(&self) -> usize {
        self.listing.read().await.len()
    }

    pub async fn track_at(&self, index: usize) -> Option<Track> {
        self.listing.read().await.get(index).cloned()
    }

    pub async fn selected_track(&self) -> Option<(usize, Track)> {
        let listing = self.listing.read().await;
        let index = listing.selected_index()?;
        listing.get(index).cloned().map(|track| (index, track))
    }

    pub async fn page_size(&self) -> usize {
        self.listing.read().await.page_size()
    }

    pub async fn is_search_mode(&self) -> bool {
        self.listing.read().await.is_search_mode()
    }

    pub async fn replace_songs(&self, songs: Vec<Track>) -> bool {
        self.listing.write().await.replace(songs)
    }

    pub async fn apply_search_results(&self, results: Vec<Track>) {
        self.listing.write().await.apply_search(results);
    }

    pub async fn clear_search_results(&self) -> bool {
        self.listing.write().await.clear_search()
    }

    pub async fn insert_next(&self, track: Track, current: Option<usize>) -> Option<usize> {
        self.listing.write().await.insert_next(track, current)
    }

    pub async fn next_page(&self) -> bool {
        self.listing.write().await.next_page()
    }

    pub async fn prev_page(&self) -> bool {
        self.listing.write().await.prev_page()
    }

    pub async fn first_page(&self) {
        self.listing.write().await.first_page();
    }

    pub async fn last_page(&self) {
        self.listing.write().await.last_page();
    }

    pub async fn select_next_row(&self) {
        self.listing.write().await.select_next_row();
    }

    pub async fn select_prev_row(&self) {
        self.listing.write().await.select_prev_row();
    }

    pub async fn get_listing_view(&self) -> ListingView {
        self.listing.read().await.view()
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_focus(&self) -> Focus {
        self.ui_state.lock().await.focus
    }

    pub async fn set_focus(&self, focus: Focus) {
        self.ui_state.lock().await.focus = focus;
    }

    pub async fn get_search_query(&self) -> String {
        self.ui_state.lock().await.search_query.clone()
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    pub async fn clear_search_query(&self) {
        self.ui_state.lock().await.search_query.clear();
    }

    pub async fn get_overlay(&self) -> Overlay {
        self.ui_state.lock().await.overlay.clone()
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.overlay = Overlay::Help;
    }

    pub async fn show_queue_popup(&self, entries: Vec<QueueEntry>) {
        self.ui_state.lock().await.overlay = Overlay::Queue(entries);
    }

    pub async fn hide_overlay(&self) {
        self.ui_state.lock().await.overlay = Overlay::None;
    }

    pub async fn set_status_message(&self, message: impl Into<String>) {
        self.ui_state.lock().await.status_message = Some(message.into());
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_TTL_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }
}
