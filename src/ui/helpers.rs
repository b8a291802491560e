use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Language;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// A-Z strip above a letter index. Letters without songs are dimmed.
pub(crate) fn alphabet_strip(alphabet: &[(char, bool)]) -> Line<'static> {
    let present = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let absent = Style::default().fg(Color::DarkGray);

    let spans = alphabet
        .iter()
        .map(|&(letter, has_songs)| {
            Span::styled(
                format!("{letter} "),
                if has_songs { present } else { absent },
            )
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Language choices for the song view, with the active one highlighted.
pub(crate) fn language_bar(active: Language) -> Line<'static> {
    let mut spans = Vec::with_capacity(Language::ALL.len() * 2);
    for (idx, language) in Language::ALL.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let shortcut = language.slug().chars().next().unwrap_or(' ');
        let text = format!("[{shortcut}] {}", language.label());
        let style = if *language == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

/// Clamp a cursor after the list it points into changed length.
pub(crate) fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        selected.min(len - 1)
    }
}
