//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists)
//! - `layout`: Top bar and now-playing panel
//! - `content`: Song table for the current page
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, help, queue)
//!
//! Rendering only reads the [`ViewState`] snapshot assembled by the UI loop.

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::config::UiConfig;
use crate::model::{ListingView, NowPlaying, Overlay, ProgressSnapshot, UiState};

/// Everything one frame needs, copied out of the model before drawing.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    pub now_playing: NowPlaying,
    pub progress: Option<ProgressSnapshot>,
    pub listing: ListingView,
    pub ui_state: UiState,
    /// Absolute listing index of the current track
    pub playing_index: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
pub struct ViewConfig {
    pub progress_bar_width: usize,
    pub max_column_width: usize,
}

impl From<&UiConfig> for ViewConfig {
    fn from(ui: &UiConfig) -> Self {
        Self {
            progress_bar_width: ui.progress_bar_width,
            max_column_width: ui.max_column_width,
        }
    }
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, state: &ViewState, config: &ViewConfig) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + page info
                Constraint::Min(0),    // Song table + now playing
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], state);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(70), // Songs
                Constraint::Percentage(30), // Now playing
            ])
            .split(chunks[1]);

        content::render_song_table(frame, main_chunks[0], state, config);
        layout::render_now_playing(frame, main_chunks[1], state, config);

        progress::render_progress_bar(frame, chunks[2], state);

        match &state.ui_state.overlay {
            Overlay::Help => overlays::render_help_popup(frame),
            Overlay::Queue(entries) => overlays::render_queue_popup(frame, entries),
            Overlay::None => {}
        }

        // Errors draw last so they are never hidden by a popup
        if state.ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, &state.ui_state);
        }
    }
}
