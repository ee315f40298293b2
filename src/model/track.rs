//! Library tracks and playback queue entries

use chrono::{DateTime, Utc};

/// A song as returned by the music server. Immutable once fetched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Length in seconds
    pub duration: u32,
    pub track_number: u32,
    pub size: u64,
    /// Kilobits per second
    pub bit_rate: u32,
    /// Hertz
    pub sample_rate: u32,
    pub channel_count: u32,
    pub content_type: String,
    pub suffix: String,
    pub path: String,
    pub cover_art: Option<String>,
    pub play_count: u32,
    pub created: Option<DateTime<Utc>>,
    pub played: Option<DateTime<Utc>>,
}

impl Track {
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }

    /// Short audio format label, e.g. `FLAC` or `MP3`
    pub fn format_label(&self) -> String {
        if !self.suffix.is_empty() {
            self.suffix.to_uppercase()
        } else {
            self.content_type
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_uppercase()
        }
    }
}

/// A playback-ready projection of a [`Track`] held in the player's queue.
#[derive(Clone, Debug, PartialEq)]
pub struct QueueEntry {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub artist: String,
    pub duration: u32,
}

impl QueueEntry {
    pub fn from_track(track: &Track, uri: impl Into<String>) -> Self {
        Self {
            id: track.id.clone(),
            uri: uri.into(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration: track.duration,
        }
    }
}
