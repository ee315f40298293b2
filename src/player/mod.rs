//! Player port - the audio engine seen by the controller
//!
//! [`MpvPlayer`] drives an mpv child process over its JSON IPC socket. The
//! controller never talks to mpv directly; it bounds every [`PlayerPort`]
//! call with its own timeout.

mod mpv;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::PortError;
use crate::model::QueueEntry;

pub use mpv::MpvPlayer;

/// Result of a pause toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseOutcome {
    /// Nothing loaded and nothing queued
    Stopped,
    Playing,
    Paused,
}

/// Asynchronous notifications from the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// A new file started loading
    Loading,
    /// The file is loaded and audio is flowing
    Playing,
    /// The current track played to its natural end
    EndOfTrack,
    /// Playback ended on request (stop, replacement, quit)
    Stopped,
    Failed(String),
    Other(String),
}

#[async_trait]
pub trait PlayerPort: Send + Sync {
    async fn play(&self, url: &str) -> Result<(), PortError>;

    async fn pause(&self) -> Result<PauseOutcome, PortError>;

    async fn stop(&self) -> Result<(), PortError>;

    /// `(position, duration)` in seconds
    async fn get_progress(&self) -> Result<(f64, f64), PortError>;

    async fn get_volume(&self) -> Result<f64, PortError>;

    async fn set_volume(&self, volume: f64) -> Result<(), PortError>;

    async fn is_playing(&self) -> bool;

    async fn is_paused(&self) -> Result<bool, PortError>;

    async fn is_song_loaded(&self) -> Result<bool, PortError>;

    async fn add_to_queue(&self, entry: QueueEntry);

    async fn get_queue(&self) -> Vec<QueueEntry>;

    async fn clear_queue(&self);

    /// Engine event stream. Can be taken once; later calls return `None`.
    async fn event_channel(&self) -> Option<mpsc::UnboundedReceiver<PlayerEvent>>;

    /// Shut the engine down. Safe to call more than once; only the first
    /// call has an effect.
    async fn cleanup(&self);
}
