//! Core type definitions for the UI

use std::time::Instant;

use super::track::QueueEntry;

/// Which widget receives key input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Songs,
    Search,
}

/// Modal popup drawn on top of the main layout
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help,
    Queue(Vec<QueueEntry>),
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub focus: Focus,
    pub search_query: String,
    pub overlay: Overlay,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub status_message: Option<String>,
}
