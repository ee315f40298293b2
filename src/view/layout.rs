//! Layout rendering (top bar, now-playing panel)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{Focus, PlaybackPhase};

use super::utils::{history_info, tech_info};
use super::{ViewConfig, ViewState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(36), // Status + page info
        ])
        .split(area);

    let ui_state = &state.ui_state;
    let focused = ui_state.focus == Focus::Search;

    let search_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() && !focused {
        "Press / to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let listing = &state.listing;
    let mode = if listing.search_mode { " [search]" } else { "" };
    let page_info = format!(
        "Page {}/{} · {} songs{}",
        listing.current_page, listing.total_pages, listing.total_songs, mode
    );
    let status_title = match &ui_state.status_message {
        Some(message) => format!(" {} ", message),
        None => " navi-rs ".to_string(),
    };

    let info = Paragraph::new(page_info)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(status_title));
    frame.render_widget(info, chunks[1]);
}

pub fn render_now_playing(frame: &mut Frame, area: Rect, state: &ViewState, config: &ViewConfig) {
    let now_playing = &state.now_playing;

    let phase_style = match now_playing.phase {
        PlaybackPhase::Playing => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        PlaybackPhase::Paused => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        PlaybackPhase::Loading => Style::default().fg(Color::Cyan),
        PlaybackPhase::Failed => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        PlaybackPhase::Idle => Style::default().fg(Color::DarkGray),
    };

    let mut lines = vec![Line::from(Span::styled(now_playing.phase.label(), phase_style))];

    match &now_playing.track {
        Some(track) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                track.title.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(vec![
                Span::styled("Artist: ", Style::default().fg(Color::DarkGray)),
                Span::raw(track.artist.clone()),
            ]));
            let album = if track.track_number > 0 {
                format!("{} (#{})", track.album, track.track_number)
            } else {
                track.album.clone()
            };
            lines.push(Line::from(vec![
                Span::styled("Album:  ", Style::default().fg(Color::DarkGray)),
                Span::raw(album),
            ]));
            let info = tech_info(track);
            if !info.is_empty() {
                lines.push(Line::from(Span::styled(info, Style::default().fg(Color::Cyan))));
            }
            lines.push(Line::from(Span::styled(
                history_info(track),
                Style::default().fg(Color::DarkGray),
            )));
            if !track.path.is_empty() {
                lines.push(Line::from(Span::styled(
                    track.path.clone(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from("Nothing playing"));
        }
    }

    if let Some(detail) = &now_playing.detail {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            detail.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    if let Some(progress) = &state.progress {
        lines.push(Line::from(""));
        lines.push(Line::from(progress.time_text()));
        lines.push(Line::from(Span::styled(
            progress.bar(config.progress_bar_width),
            Style::default().fg(Color::Green),
        )));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Now Playing ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(panel, area);
}
