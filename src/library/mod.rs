//! Library port - access to the music server
//!
//! The controller only sees the [`LibraryPort`] trait; [`SubsonicClient`] is
//! the production implementation speaking the Subsonic REST API.

mod subsonic;

use async_trait::async_trait;

use crate::error::PortError;
use crate::model::Track;

pub use subsonic::SubsonicClient;

#[async_trait]
pub trait LibraryPort: Send + Sync {
    async fn get_random_songs(&self, count: usize) -> Result<Vec<Track>, PortError>;

    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<Track>, PortError>;

    /// Authenticated stream URL for a track.
    async fn get_play_url(&self, track_id: &str) -> Result<String, PortError>;

    fn get_cover_art_url(&self, cover_art_id: &str) -> Result<String, PortError>;

    async fn ping(&self) -> Result<(), PortError>;
}
