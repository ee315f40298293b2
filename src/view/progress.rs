//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlaybackPhase;

use super::ViewState;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let icon = match state.now_playing.phase {
        PlaybackPhase::Playing => "▶",
        PlaybackPhase::Paused => "⏸",
        PlaybackPhase::Loading => "…",
        PlaybackPhase::Failed => "✗",
        PlaybackPhase::Idle => "■",
    };
    let title = format!(" {} {} ", icon, state.now_playing.headline());

    let (ratio, time_str, volume_text) = match &state.progress {
        Some(progress) => (
            progress.fraction(),
            progress.time_text(),
            progress.volume_text(),
        ),
        None => (0.0, "00:00/00:00".to_string(), "??".to_string()),
    };

    let gauge_color = match state.now_playing.phase {
        PlaybackPhase::Failed => Color::Red,
        PlaybackPhase::Paused => Color::Yellow,
        _ => Color::Green,
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(format!(" Vol: {} ", volume_text)).right_aligned()),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
