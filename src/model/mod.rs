//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `track`: Library tracks and queue entries
//! - `player_state`: Shared playback state guarded for concurrent tasks
//! - `listing`: Paginated song listing, search snapshot and insert-next
//! - `status`: Now-playing and progress projections published to the view
//! - `types`: UI focus, overlays and UI state
//! - `app_model`: Main application model with state management methods

mod track;
mod player_state;
mod listing;
mod status;
mod types;
mod app_model;

pub use track::{QueueEntry, Track};

pub use listing::ListingView;

pub use status::{format_duration, NowPlaying, PlaybackPhase, ProgressSnapshot};

pub use types::{Focus, Overlay, UiState};

pub use app_model::AppModel;
