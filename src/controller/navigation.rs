//! Listing navigation: loading, search, insert-next and pagination
//!
//! Fetches run on background tasks and come back as [`UiUpdate`]s; the
//! listing itself is only changed from the UI loop.

use tokio::task::JoinHandle;

use crate::log_port_result;
use crate::model::Track;

use super::{AppController, UiUpdate};

impl AppController {
    /// Fetch a fresh batch of random songs.
    pub fn load_music(&self) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            let count = controller.model.page_size().await * controller.settings.load_pages;
            tracing::debug!(count, "Loading random songs");

            let result = controller.library.get_random_songs(count).await;
            log_port_result!("get_random_songs", result);
            match result {
                Ok(songs) => controller.send_update(UiUpdate::MusicLoaded(songs)),
                Err(e) => controller.send_update(UiUpdate::Error(format!(
                    "Failed to load music: {}",
                    Self::format_error(&e)
                ))),
            }
        })
    }

    /// Search the server. Empty queries are ignored.
    pub async fn perform_search(&self, query: &str) -> Option<JoinHandle<()>> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        self.model
            .set_status_message(format!("Searching for \"{query}\"..."))
            .await;

        let controller = self.clone();
        Some(tokio::spawn(async move {
            let result = controller
                .library
                .search_songs(&query, controller.settings.search_limit)
                .await;
            log_port_result!("search_songs", result);
            match result {
                Ok(songs) => controller.send_update(UiUpdate::SearchCompleted { query, songs }),
                Err(e) => controller.send_update(UiUpdate::Error(format!(
                    "Search failed: {}",
                    Self::format_error(&e)
                ))),
            }
        }))
    }

    pub async fn clear_search(&self) {
        if self.model.clear_search_results().await {
            tracing::info!("Search cleared, listing restored");
            self.model.set_status_message("Search cleared").await;
        }
        self.model.clear_search_query().await;
    }

    /// Queue `track` to play right after the current one.
    pub async fn insert_next(&self, track: Track) {
        let state = self.model.player_state();
        let snapshot = state.get_state().await;
        let current = snapshot.index();
        let current_id = snapshot.track().map(|t| t.id.clone());
        let title = track.title.clone();

        let adjusted = self.model.insert_next(track, current).await;
        if let (Some(index), Some(id)) = (adjusted, current_id) {
            // A play request may have replaced the track since the read above
            if Some(index) != current && !state.set_current_index_if(&id, index).await {
                tracing::debug!(index, "Current track changed, keeping its index");
            }
        }

        tracing::info!(title = %title, ?current, ?adjusted, "Inserted track to play next");
        self.model
            .set_status_message(format!("Playing next: {title}"))
            .await;
    }

    pub async fn insert_selected_next(&self) {
        if let Some((_, track)) = self.model.selected_track().await {
            self.insert_next(track).await;
        }
    }

    pub async fn play_selected(&self) {
        if let Some((index, _)) = self.model.selected_track().await {
            self.play_song_at_index(index).await;
        }
    }

    pub async fn show_queue(&self) {
        let entries = self.player.get_queue().await;
        self.model.show_queue_popup(entries).await;
    }

    pub async fn clear_queue(&self) {
        self.player.clear_queue().await;
        self.model.show_queue_popup(Vec::new()).await;
    }

    /// Apply the result of a background fetch. Called from the UI loop.
    pub async fn apply_ui_update(&self, update: UiUpdate) {
        match update {
            UiUpdate::MusicLoaded(songs) => {
                let count = songs.len();
                if self.model.replace_songs(songs).await {
                    tracing::info!(count, "Listing replaced");
                }
                self.model
                    .set_status_message(format!("Loaded {count} songs"))
                    .await;
            }
            UiUpdate::SearchCompleted { query, songs } => {
                tracing::info!(query = %query, results = songs.len(), "Search completed");
                self.model
                    .set_status_message(format!("{} results for \"{query}\"", songs.len()))
                    .await;
                self.model.apply_search_results(songs).await;
            }
            UiUpdate::Error(message) => self.model.set_error(message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{FakeLibrary, FakePlayer, Harness, tracks};

    fn ids(view: &crate::model::ListingView) -> Vec<String> {
        view.rows.iter().map(|t| t.id.clone()).collect()
    }

    #[tokio::test]
    async fn load_music_fills_listing() {
        let mut h = Harness::new(FakeLibrary::new(tracks(5)), FakePlayer::new()).await;
        h.model.replace_songs(Vec::new()).await;

        h.controller.load_music().await.unwrap();
        h.drain_updates().await;

        assert_eq!(h.model.listing_len().await, 5);
        assert_eq!(h.model.get_listing_view().await.current_page, 1);
    }

    #[tokio::test]
    async fn search_round_trip_restores_listing() {
        let mut library = FakeLibrary::new(tracks(3));
        library.search_results = vec![crate::model::Track {
            id: "s1".into(),
            title: "Found".into(),
            ..Default::default()
        }];
        let mut h = Harness::new(library, FakePlayer::new()).await;
        let before = ids(&h.model.get_listing_view().await);

        h.controller.perform_search("found").await.unwrap().await.unwrap();
        h.drain_updates().await;
        let view = h.model.get_listing_view().await;
        assert!(view.search_mode);
        assert_eq!(ids(&view), vec!["s1"]);
        assert_eq!(view.total_pages, 1);

        h.controller.clear_search().await;
        let view = h.model.get_listing_view().await;
        assert!(!view.search_mode);
        assert_eq!(ids(&view), before);
    }

    #[tokio::test]
    async fn empty_query_is_ignored() {
        let h = Harness::with_tracks(2).await;
        assert!(h.controller.perform_search("   ").await.is_none());
        assert!(!h.model.is_search_mode().await);
    }

    #[tokio::test]
    async fn failed_search_keeps_listing() {
        let mut library = FakeLibrary::new(tracks(2));
        library.search_fails = true;
        let mut h = Harness::new(library, FakePlayer::new()).await;

        h.controller.perform_search("x").await.unwrap().await.unwrap();
        h.drain_updates().await;

        assert!(!h.model.is_search_mode().await);
        assert_eq!(h.model.listing_len().await, 2);
        let error = h.model.get_ui_state().await.error_message.unwrap();
        assert!(error.starts_with("Search failed"));
    }

    #[tokio::test]
    async fn insert_next_writes_corrected_index_back() {
        let h = Harness::with_tracks(5).await;
        h.controller.play_song_at_index(3).await.unwrap().await.unwrap();

        let moved = h.model.track_at(1).await.unwrap();
        h.controller.insert_next(moved).await;

        let state = h.model.player_state().get_state().await;
        assert_eq!(state.index(), Some(2));
        assert_eq!(state.track().map(|t| t.id.as_str()), Some("t3"));
        assert_eq!(h.model.track_at(3).await.unwrap().id, "t1");

        // The moved track now plays next
        h.controller.play_next().await.unwrap().await.unwrap();
        assert_eq!(h.player.played().last().map(String::as_str), Some("fake://t1"));
    }

    #[tokio::test]
    async fn queue_overlay_lists_player_queue() {
        let h = Harness::with_tracks(2).await;
        h.controller.play_song_at_index(1).await.unwrap().await.unwrap();

        h.controller.show_queue().await;
        match h.model.get_overlay().await {
            crate::model::Overlay::Queue(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].id, "t1");
            }
            other => panic!("unexpected overlay {other:?}"),
        }

        h.controller.clear_queue().await;
        assert_eq!(
            h.model.get_overlay().await,
            crate::model::Overlay::Queue(Vec::new())
        );
    }
}
