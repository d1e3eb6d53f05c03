//! Status bar rendering with keybindings and state indicators

use crate::snapshot::TimelineState;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Everything the status bar shows
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub state: TimelineState,
    pub total_steps: usize,
    pub is_playing: bool,
    pub speed_label: String,
    /// Contained fault, if the run stopped early
    pub fault: Option<&'a str>,
}

impl StatusRenderData<'_> {
    /// 1-based step shown to the user; 0 at genesis
    fn step(&self) -> usize {
        match self.state {
            TimelineState::Idle => 0,
            TimelineState::Positioned(k) => k + 1,
            TimelineState::Finished => self.total_steps,
        }
    }
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bar = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let (message, message_color) = match data.fault {
        Some(fault) => (fault, DEFAULT_THEME.error),
        None => (data.message, DEFAULT_THEME.fg),
    };

    let left_spans = vec![
        Span::styled(
            format!(" Step {}/{} ", data.step(), data.total_steps),
            Style::default()
                .bg(if data.fault.is_some() {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.primary
                })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", bar.fg(DEFAULT_THEME.comment)),
        Span::styled(format!(" {} ", message), bar.fg(message_color)),
    ];

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar)
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar.fg(DEFAULT_THEME.fg);
    let sep_style = bar.fg(DEFAULT_THEME.comment);

    let mut right_spans = Vec::new();
    for (key, desc) in [
        (" ←/→ ", " step "),
        (" ⎵ ", " play "),
        (" +/- ", " speed "),
        (" ↵ / ⌫ ", " end/start "),
        (" r ", " reset "),
        (" q ", " quit "),
    ] {
        if !right_spans.is_empty() {
            right_spans.push(Span::styled("│", sep_style));
            right_spans.push(Span::styled(" ", desc_style));
        }
        right_spans.push(Span::styled(key, key_style));
        right_spans.push(Span::styled(desc, desc_style));
    }

    right_spans.push(Span::styled("│", sep_style));
    right_spans.push(Span::styled(format!(" {} ", data.speed_label), desc_style));

    let badge = if data.is_playing {
        Some((" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else {
        match data.state {
            TimelineState::Finished => Some((" END ", DEFAULT_THEME.error)),
            TimelineState::Idle => Some((" START ", DEFAULT_THEME.success)),
            TimelineState::Positioned(_) => None,
        }
    };

    if let Some((label, color)) = badge {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            label,
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar)
            .alignment(Alignment::Right),
        layout[1],
    );
}
