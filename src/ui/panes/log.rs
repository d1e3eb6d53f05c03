//! Command log pane rendering

use super::{clamp_scroll, pane_block};
use crate::runtime::CommandLog;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the command log, keeping the cursor in view unless the user
/// scrolled away from it
pub fn render_log_pane(
    frame: &mut Frame,
    area: Rect,
    log: &CommandLog,
    cursor: Option<usize>,
    is_focused: bool,
    scroll_offset: &mut usize,
    follow_cursor: bool,
) {
    let block = pane_block(" Command Log ", is_focused);

    if log.is_empty() {
        let paragraph = Paragraph::new("(no commands)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if follow_cursor {
        let row = cursor.unwrap_or(0);
        if row < *scroll_offset {
            *scroll_offset = row;
        } else if row >= *scroll_offset + visible_height {
            *scroll_offset = row + 1 - visible_height;
        }
    }
    clamp_scroll(scroll_offset, log.len(), visible_height);

    let items: Vec<ListItem> = log
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(i, command)| {
            let applied = cursor.is_some_and(|k| i <= k);
            let is_current = cursor == Some(i);

            let marker = if is_current { "▶" } else { " " };
            let text_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD)
            } else if applied {
                Style::default().fg(DEFAULT_THEME.fg)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}{:4} ", marker, i + 1),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(command.to_string(), text_style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
