//! Shared playback state
//!
//! `PlayerState` is the only structure written by more than one task: the UI
//! context, per-request play tasks, the player event bridge and the progress
//! sampler all hold a clone of the same handle. Every read is one consistent
//! snapshot; every write is a short critical section.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::track::Track;

/// Point-in-time copy of [`PlayerState`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerSnapshot {
    /// Current track and its position in the listing. A track is current
    /// exactly when an index is set.
    pub current: Option<(usize, Track)>,
    pub is_playing: bool,
    pub is_loading: bool,
}

impl PlayerSnapshot {
    pub fn track(&self) -> Option<&Track> {
        self.current.as_ref().map(|(_, track)| track)
    }

    pub fn index(&self) -> Option<usize> {
        self.current.as_ref().map(|(index, _)| *index)
    }
}

#[derive(Clone)]
pub struct PlayerState {
    inner: Arc<RwLock<PlayerSnapshot>>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(PlayerSnapshot::default())),
        }
    }

    pub async fn get_state(&self) -> PlayerSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn set_loading(&self, loading: bool) {
        self.inner.write().await.is_loading = loading;
    }

    pub async fn set_playing(&self, playing: bool) {
        self.inner.write().await.is_playing = playing;
    }

    /// Install a track without going through the loading gate.
    #[allow(dead_code)]
    pub async fn set_current_song(&self, track: Track, index: usize) {
        self.inner.write().await.current = Some((index, track));
    }

    pub async fn clear_current_song(&self) {
        self.inner.write().await.current = None;
    }

    /// Move the current track to a new listing position, but only while the
    /// track with `track_id` is still current. Returns whether it moved.
    pub async fn set_current_index_if(&self, track_id: &str, index: usize) -> bool {
        let mut state = self.inner.write().await;
        match state.current.as_mut() {
            Some((current, track)) if track.id == track_id => {
                *current = index;
                true
            }
            _ => false,
        }
    }

    /// Claim the loading gate for a new play request.
    ///
    /// Returns `false` without touching anything when another request is
    /// still loading. Otherwise marks loading, installs the requested track
    /// and clears `is_playing` in one critical section.
    pub async fn try_begin_load(&self, track: Track, index: usize) -> bool {
        let mut state = self.inner.write().await;
        if state.is_loading {
            return false;
        }
        state.is_loading = true;
        state.current = Some((index, track));
        state.is_playing = false;
        true
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {id}"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn starts_idle() {
        let state = PlayerState::new();
        let snapshot = state.get_state().await;
        assert_eq!(snapshot.index(), None);
        assert!(snapshot.track().is_none());
        assert!(!snapshot.is_playing);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn index_and_track_move_together() {
        let state = PlayerState::new();
        state.set_current_song(track("a"), 3).await;
        let snapshot = state.get_state().await;
        assert_eq!(snapshot.index(), Some(3));
        assert_eq!(snapshot.track().map(|t| t.id.as_str()), Some("a"));

        state.clear_current_song().await;
        let snapshot = state.get_state().await;
        assert_eq!(snapshot.index(), None);
        assert!(snapshot.track().is_none());
    }

    #[tokio::test]
    async fn index_moves_only_for_the_named_track() {
        let state = PlayerState::new();
        assert!(!state.set_current_index_if("a", 4).await);
        assert_eq!(state.get_state().await.index(), None);

        state.set_current_song(track("a"), 1).await;
        assert!(state.set_current_index_if("a", 4).await);
        let snapshot = state.get_state().await;
        assert_eq!(snapshot.index(), Some(4));
        assert_eq!(snapshot.track().map(|t| t.id.as_str()), Some("a"));

        // Another request replaced the track in the meantime
        state.set_current_song(track("b"), 5).await;
        assert!(!state.set_current_index_if("a", 2).await);
        let snapshot = state.get_state().await;
        assert_eq!(snapshot.index(), Some(5));
        assert_eq!(snapshot.track().map(|t| t.id.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn load_gate_admits_one_request() {
        let state = PlayerState::new();
        state.set_playing(true).await;

        assert!(state.try_begin_load(track("a"), 0).await);
        let snapshot = state.get_state().await;
        assert!(snapshot.is_loading);
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.index(), Some(0));

        assert!(!state.try_begin_load(track("b"), 1).await);
        assert_eq!(state.get_state().await.index(), Some(0));

        state.set_loading(false).await;
        assert!(state.try_begin_load(track("b"), 1).await);
        assert_eq!(state.get_state().await.index(), Some(1));
    }

    #[tokio::test]
    async fn concurrent_requesters_cannot_both_pass_the_gate() {
        let state = PlayerState::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                state.try_begin_load(track(&i.to_string()), i).await
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
