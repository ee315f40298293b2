//! Utility functions for rendering UI components

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

use crate::model::Track;

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// `FLAC | 24.3 MB | 1011 kbps | 44.1 kHz`, skipping unknown fields
pub fn tech_info(track: &Track) -> String {
    let mut parts = Vec::new();
    let format = track.format_label();
    if !format.is_empty() {
        parts.push(format);
    }
    if track.size > 0 {
        parts.push(format!("{:.1} MB", track.size_mb()));
    }
    if track.bit_rate > 0 {
        parts.push(format!("{} kbps", track.bit_rate));
    }
    if track.sample_rate > 0 {
        parts.push(format!("{:.1} kHz", track.sample_rate as f64 / 1000.0));
    }
    match track.channel_count {
        0 => {}
        1 => parts.push("mono".to_string()),
        2 => parts.push("stereo".to_string()),
        n => parts.push(format!("{n} ch")),
    }
    parts.join(" | ")
}

/// Play count plus added/last-played dates, e.g. `12 plays | added 2024-01-05`
pub fn history_info(track: &Track) -> String {
    let mut parts = vec![match track.play_count {
        1 => "1 play".to_string(),
        n => format!("{n} plays"),
    }];
    if let Some(created) = track.created {
        parts.push(format!("added {}", created.format("%Y-%m-%d")));
    }
    if let Some(played) = track.played {
        parts.push(format!("last {}", played.format("%Y-%m-%d")));
    }
    parts.join(" | ")
}
