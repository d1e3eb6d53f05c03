//! Source code pane rendering with syntax highlighting
//!
//! This module renders the program being traced, highlighting the line that
//! produced the command at the cursor. Commands carry their line's text
//! rather than its number, so the line is found with [`locate_line`].
//!
//! # Features
//!
//! - Syntax highlighting for keywords, container and scalar types, strings,
//!   numbers and comments
//! - Current line highlighting, red when the run faulted on that line
//! - Scroll state that keeps the current line at a fixed visual row

use super::pane_block;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// 1-based number of the first source line whose trimmed text is `text`
pub fn locate_line(source: &str, text: &str) -> Option<usize> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    source
        .lines()
        .position(|line| line.trim() == text)
        .map(|i| i + 1)
}

/// Simple syntax highlighting for one source line
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        // Comments and preprocessor lines run to the end
        if (c == '/' && chars.get(i + 1).is_some_and(|&(_, n)| n == '/'))
            || (c == '#' && line[..offset].trim().is_empty())
        {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            spans.push(Span::styled(
                line[offset..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == '"' || c == '\'' {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            end = (end + 1).min(chars.len());
            let end_offset = chars.get(end).map_or(line.len(), |&(o, _)| o);
            spans.push(Span::styled(
                line[offset..end_offset].to_string(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            if !current_word.is_empty() {
                let style = get_keyword_style(&current_word, c == '(');
                spans.push(Span::styled(std::mem::take(&mut current_word), style));
            }

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                '<' | '>' => Style::default().fg(DEFAULT_THEME.type_name),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = get_keyword_style(&current_word, false);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "stack" | "queue" | "list" | "int" | "char" | "void" | "bool" | "float" | "double"
        | "long" | "short" | "unsigned" | "signed" | "string" | "auto" | "size_t" => {
            Style::default().fg(DEFAULT_THEME.type_name)
        }
        "return" | "if" | "else" | "while" | "for" | "do" | "break" | "continue" | "const"
        | "using" | "namespace" | "std" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "nullptr" | "NULL" | "endl" => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        w if w.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to; centered on first render
    pub target_line_row: Option<usize>,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: Option<usize>,
    is_fault: bool,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = pane_block(" Source Code ", is_focused);

    if source_code.is_empty() {
        let paragraph = Paragraph::new("(replaying a saved log, no source)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if let Some(line) = current_line.filter(|&l| l > 0 && l <= total_lines) {
        scroll_state.offset = (line - 1).saturating_sub(target_row);
        super::clamp_scroll(&mut scroll_state.offset, total_lines, visible_height);
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = current_line == Some(line_num);
            let mut content = highlight_source_code(line);

            let num_style = if is_current && is_fault {
                for span in &mut content.spans {
                    span.style = Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD);
                }
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                for span in &mut content.spans {
                    span.style = span.style.patch(Style::default().bg(DEFAULT_THEME.current_line_bg));
                }
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_line_matches_trimmed_text() {
        let source = "stack<int> s;\nint main() {\n    s.push(1);\n}\n";
        assert_eq!(locate_line(source, "s.push(1);"), Some(3));
        assert_eq!(locate_line(source, "s.pop();"), None);
        assert_eq!(locate_line(source, ""), None);
    }

    #[test]
    fn test_highlight_keeps_text() {
        let line = "  q.push(\"a\"); // enqueue";
        let rendered: String = highlight_source_code(line)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(rendered, line);
    }
}
