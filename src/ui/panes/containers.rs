//! Container pane: the snapshot at the cursor
//!
//! Every container gets a header line followed by its contents:
//!
//! - stacks are drawn top first, one plate per row;
//! - queues run front to back on one row;
//! - arrays show every slot with its index, `·` for unwritten slots;
//! - linked lists run head to tail, ending in `null`.
//!
//! Items created by the current command are drawn in bold.

use super::{clamp_scroll, pane_block};
use crate::runtime::Scalar;
use crate::snapshot::{ContainerSnapshot, Item, ItemId, SnapshotSet};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Padding, Paragraph},
    Frame,
};

fn scalar_text(value: &Scalar) -> String {
    value.to_string()
}

fn item_style(color: Color, id: ItemId, newest: Option<ItemId>) -> Style {
    let style = Style::default().fg(color);
    if Some(id) == newest {
        style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        style
    }
}

fn header(kind: &str, name: &str, len: usize, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{} ", kind),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            name.to_string(),
            Style::default()
                .fg(DEFAULT_THEME.fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({})", len),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    ])
}

fn empty_line() -> Line<'static> {
    Line::from(Span::styled(
        "  (empty)",
        Style::default().fg(DEFAULT_THEME.comment),
    ))
}

fn stack_lines(items: &[Item], newest: Option<ItemId>) -> Vec<Line<'static>> {
    let color = DEFAULT_THEME.stack;
    let width = items
        .iter()
        .map(|i| scalar_text(&i.value).chars().count())
        .max()
        .unwrap_or(0);

    items
        .iter()
        .rev()
        .enumerate()
        .map(|(depth, item)| {
            let mut spans = vec![
                Span::styled("  │ ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(
                    format!("{:^width$}", scalar_text(&item.value), width = width),
                    item_style(color, item.id, newest),
                ),
                Span::styled(" │", Style::default().fg(DEFAULT_THEME.comment)),
            ];
            if depth == 0 {
                spans.push(Span::styled(
                    " ← top",
                    Style::default().fg(DEFAULT_THEME.comment),
                ));
            }
            Line::from(spans)
        })
        .collect()
}

/// One-row rendering shared by queues and lists
fn row_line(
    items: &[Item],
    color: Color,
    newest: Option<ItemId>,
    lead: &'static str,
    separator: &'static str,
    tail: &'static str,
) -> Line<'static> {
    let muted = Style::default().fg(DEFAULT_THEME.comment);
    let mut spans = vec![Span::styled(lead, muted)];
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(separator, muted));
        }
        spans.push(Span::styled(
            format!("[{}]", scalar_text(&item.value)),
            item_style(color, item.id, newest),
        ));
    }
    spans.push(Span::styled(tail, muted));
    Line::from(spans)
}

fn container_lines(container: &ContainerSnapshot, newest: Option<ItemId>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match container {
        ContainerSnapshot::Stack { name, items } => {
            lines.push(header("stack", name, items.len(), DEFAULT_THEME.stack));
            if items.is_empty() {
                lines.push(empty_line());
            } else {
                lines.extend(stack_lines(items, newest));
                lines.push(Line::from(Span::styled(
                    "  └─────┘",
                    Style::default().fg(DEFAULT_THEME.comment),
                )));
            }
        }
        ContainerSnapshot::Queue { name, items } => {
            lines.push(header("queue", name, items.len(), DEFAULT_THEME.queue));
            if items.is_empty() {
                lines.push(empty_line());
            } else {
                lines.push(row_line(items, DEFAULT_THEME.queue, newest, "  front ", " ", " back"));
            }
        }
        ContainerSnapshot::Array { name, slots } => {
            lines.push(header("array", name, slots.len(), DEFAULT_THEME.array));
            let muted = Style::default().fg(DEFAULT_THEME.comment);
            let mut spans = vec![Span::raw("  ")];
            for slot in slots {
                spans.push(Span::styled(format!("{}:", slot.index), muted));
                let (text, style) = match &slot.value {
                    Some(value) => (scalar_text(value), item_style(DEFAULT_THEME.array, slot.id, newest)),
                    None => ("·".to_string(), muted),
                };
                spans.push(Span::styled(text, style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        ContainerSnapshot::LinkedList { name, nodes } => {
            lines.push(header("list", name, nodes.len(), DEFAULT_THEME.list));
            lines.push(row_line(nodes, DEFAULT_THEME.list, newest, "  head → ", " → ", " → null"));
        }
    }

    lines.push(Line::default());
    lines
}

/// Render every container of `snapshot`
pub fn render_containers_pane(
    frame: &mut Frame,
    area: Rect,
    snapshot: &SnapshotSet,
    newest: Option<ItemId>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Containers ", is_focused);

    if snapshot.is_empty() {
        let paragraph = Paragraph::new("(no containers yet)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<Line> = snapshot
        .containers()
        .iter()
        .flat_map(|c| container_lines(c, newest))
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, lines.len(), visible_height);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let paragraph = Paragraph::new(visible).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn item(id: u64, value: i64) -> Item {
        Item {
            id: ItemId(id),
            value: Scalar::Int(value),
        }
    }

    #[test]
    fn test_stack_is_drawn_top_first() {
        let stack = ContainerSnapshot::Stack {
            name: "s".to_string(),
            items: vec![item(1, 10), item(2, 20)],
        };
        let lines = container_lines(&stack, None);
        assert_eq!(text(&lines[0]), "stack s  (2)");
        assert_eq!(text(&lines[1]), "  │ 20 │ ← top");
        assert_eq!(text(&lines[2]), "  │ 10 │");
    }

    #[test]
    fn test_list_runs_head_to_tail() {
        let list = ContainerSnapshot::LinkedList {
            name: "ll".to_string(),
            nodes: vec![item(1, 1), item(2, 3)],
        };
        let lines = container_lines(&list, Some(ItemId(2)));
        assert_eq!(text(&lines[1]), "  head → [1] → [3] → null");
    }
}
