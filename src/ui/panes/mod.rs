//! TUI pane rendering modules
//!
//! Each pane is a stateless render function over the current [`Timeline`]
//! plus whatever scroll state the [`App`] keeps for it.
//!
//! # Pane Modules
//!
//! - [`source`]: source display with syntax highlighting and the line that
//!   produced the current command
//! - [`containers`]: the snapshot at the cursor, one block per container
//! - [`log`]: the command log with the cursor highlighted
//! - [`status`]: status bar with keybindings and playback state
//!
//! [`Timeline`]: crate::snapshot::Timeline
//! [`App`]: crate::ui::App

pub mod containers;
pub mod log;
pub mod source;
pub mod status;

pub use containers::render_containers_pane;
pub use log::render_log_pane;
pub use source::{locate_line, render_source_pane, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block whose border reflects focus
fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp a scroll offset so the last page stays full
fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
}
