//! Overlay rendering (error notification, help popup, queue popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::model::{QueueEntry, UiState, format_duration};

use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    if let Some(ref error_msg) = ui_state.error_message {
        let area = frame.area();

        let popup_width = 52.min(area.width.saturating_sub(4));
        let inner_width = popup_width.saturating_sub(4).max(1) as usize;

        let error_line_count = error_msg.chars().count().div_ceil(inner_width) as u16;

        // Height: top border (1) + error lines + bottom border (1)
        let popup_height = (2 + error_line_count.max(1)).min(area.height.saturating_sub(4));
        let popup_area = centered(area, popup_width, popup_height);

        // Clear the area behind the popup first
        frame.render_widget(Clear, popup_area);

        let error_widget = Paragraph::new(error_msg.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error (Esc to dismiss) ")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .style(Style::default().bg(Color::Black)),
            );

        frame.render_widget(error_widget, popup_area);
    }
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Navigation ──"),
        ("↑ / ↓  j / k", "Move selection"),
        ("PgDn / ] / J", "Next page"),
        ("PgUp / [ / K", "Previous page"),
        ("gg / Home", "First page"),
        ("G / End", "Last page"),
        ("", ""),
        ("", "── Playback ──"),
        ("Enter", "Play selected"),
        ("Space", "Play / Pause"),
        ("→ / n / l", "Next song"),
        ("← / p / h", "Previous song"),
        ("+ / -", "Volume up / down"),
        ("a", "Play selected next"),
        ("", ""),
        ("", "── Search ──"),
        ("/", "Search the library"),
        ("Esc", "Clear search results"),
        ("", ""),
        ("", "── General ──"),
        ("q", "Show queue (c to clear)"),
        ("?", "Toggle this help"),
        ("Esc / Ctrl+C", "Quit"),
    ];

    let popup_width = 56;
    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));
    let popup_area = centered(area, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>16}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (? or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}

pub fn render_queue_popup(frame: &mut Frame, entries: &[QueueEntry]) {
    let area = frame.area();

    let popup_width = 64.min(area.width.saturating_sub(4));
    let popup_height = (entries.len().max(1) as u16 + 2)
        .min(area.height.saturating_sub(4))
        .max(3);
    let popup_area = centered(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let inner_width = popup_width.saturating_sub(2) as usize;
    let num_width = calculate_num_width(entries.len());
    let text_width = inner_width.saturating_sub(num_width + 1 + 2 + 5 + 1);

    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new(" Queue is empty").style(Style::default().fg(Color::DarkGray))]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let label = format!("{} - {}", entry.title, entry.artist);
                ListItem::new(format!(
                    " {:<num_width$}{}  {}",
                    i + 1,
                    truncate_string(&label, text_width),
                    format_duration(entry.duration as u64),
                    num_width = num_width
                ))
                .style(Style::default().fg(Color::White))
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Queue (c to clear, Esc to close) ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Black));

    render_scrollable_list(frame, popup_area, items, 0, block);
}
