//! Song table for the current page

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding},
    Frame,
};

use crate::model::format_duration;

use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};
use super::{ViewConfig, ViewState};

pub fn render_song_table(frame: &mut Frame, area: Rect, state: &ViewState, config: &ViewConfig) {
    let listing = &state.listing;
    let title = if listing.search_mode {
        format!(
            " Search Results ({}) · Page {}/{} · Esc to clear ",
            listing.total_songs, listing.current_page, listing.total_pages
        )
    } else {
        format!(
            " Songs · Page {}/{} ",
            listing.current_page, listing.total_pages
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green));

    if listing.rows.is_empty() {
        let items = vec![ListItem::new("No songs").style(Style::default().fg(Color::DarkGray))];
        render_scrollable_list(frame, area, items, 0, block);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let items = render_song_items(state, content_width, config.max_column_width);

    // +1 for header
    render_scrollable_list(frame, area, items, listing.selected_row + 1, block);
}

fn render_song_items(
    state: &ViewState,
    content_width: usize,
    max_column_width: usize,
) -> Vec<ListItem<'static>> {
    let listing = &state.listing;
    let num_width = calculate_num_width(listing.total_songs);
    let duration_width = 5;
    let fixed_width = 1 + num_width + 3 + 3 + 3 + duration_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = ((remaining_width * 55) / 100).min(max_column_width);
    let artist_width = remaining_width
        .saturating_sub(title_width)
        .min(max_column_width);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {}",
            "#", "Title", "Artist", "Time",
            num_width = num_width,
            title_width = title_width,
            artist_width = artist_width
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let song_items = listing.rows.iter().enumerate().map(|(row, track)| {
        let index = listing.page_start + row;
        let is_playing = state.playing_index == Some(index);
        let style = if row == listing.selected_row {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_playing {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let playing_indicator = if is_playing { "▶" } else { " " };
        let song_num = format!("{}{:<num_width$}", playing_indicator, index + 1, num_width = num_width);

        ListItem::new(format!(
            "{}   {}   {}   {}",
            song_num,
            truncate_string(&track.title, title_width),
            truncate_string(&track.artist, artist_width),
            format_duration(track.duration as u64)
        ))
        .style(style)
    });

    items.extend(song_items);
    items
}
