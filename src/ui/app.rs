//! Main TUI application state and logic

use crate::interpreter::errors::RuntimeError;
use crate::runtime::CommandKind;
use crate::snapshot::{ContainerSnapshot, ItemId, PlaybackSpeed, Timeline, TimelineState};
use crate::ui::panes::{self, SourceScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Longest the event loop waits for input when nothing is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Containers,
    Log,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> containers -> log)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Containers,
            FocusedPane::Containers => FocusedPane::Log,
            FocusedPane::Log => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// Replay state machine over the traced log
    pub timeline: Timeline,

    /// The traced source; empty when replaying a saved log
    pub source_code: String,

    /// Why the traced run stopped early, if it did
    pub fault: Option<RuntimeError>,

    pub focused_pane: FocusedPane,

    pub source_scroll: SourceScrollState,
    pub containers_scroll: usize,
    pub log_scroll: usize,

    /// Whether the log pane keeps the cursor in view
    pub log_follow: bool,

    pub speed: PlaybackSpeed,

    pub should_quit: bool,

    pub status_message: String,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(timeline: Timeline, source_code: String, fault: Option<RuntimeError>) -> Self {
        let speed = timeline.speed().unwrap_or_default();
        App {
            timeline,
            source_code,
            fault,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            containers_scroll: 0,
            log_scroll: 0,
            log_follow: true,
            speed,
            should_quit: false,
            status_message: String::from("Ready!"),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .timeline
                .time_until_tick(Instant::now())
                .map_or(IDLE_POLL, |t| t.min(IDLE_POLL));

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            if self.timeline.tick(Instant::now()) {
                self.log_follow = true;
                self.status_message = if self.timeline.is_playing() {
                    "Playing...".to_string()
                } else {
                    "Playback complete".to_string()
                };
            }
        }

        Ok(())
    }

    /// Source line to highlight: the fault line once the log is exhausted,
    /// otherwise the line that produced the current command
    fn current_line(&self) -> (Option<usize>, bool) {
        let at_end = matches!(self.timeline.state(), TimelineState::Finished)
            || self.timeline.log().is_empty();

        match &self.fault {
            Some(fault) if at_end && fault.line() > 0 => (Some(fault.line()), true),
            _ => {
                let line = self
                    .timeline
                    .current_command()
                    .and_then(|c| panes::locate_line(&self.source_code, &c.source_text));
                (line, false)
            }
        }
    }

    /// Item created or written by the current command
    fn highlighted_item(&self) -> Option<ItemId> {
        let command = self.timeline.current_command()?;
        let container = self
            .timeline
            .snapshot()
            .get(command.target, &command.target_name)?;

        match (command.kind, container) {
            (CommandKind::Push, ContainerSnapshot::Stack { items, .. })
            | (CommandKind::Enqueue, ContainerSnapshot::Queue { items, .. })
            | (CommandKind::ListInsert, ContainerSnapshot::LinkedList { nodes: items, .. }) => {
                items.iter().map(|i| i.id).max_by_key(|id| id.0)
            }
            (CommandKind::ArraySet, ContainerSnapshot::Array { slots, .. }) => {
                command.index.and_then(|i| slots.get(i)).map(|s| s.id)
            }
            _ => None,
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Command log (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[0]);

        let (current_line, is_fault) = self.current_line();
        panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            current_line,
            is_fault,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_log_pane(
            frame,
            left_rows[1],
            self.timeline.log(),
            self.timeline.cursor(),
            self.focused_pane == FocusedPane::Log,
            &mut self.log_scroll,
            self.log_follow,
        );

        let highlighted = self.highlighted_item();
        panes::render_containers_pane(
            frame,
            columns[1],
            self.timeline.snapshot(),
            highlighted,
            self.focused_pane == FocusedPane::Containers,
            &mut self.containers_scroll,
        );

        let fault = self
            .fault
            .as_ref()
            .filter(|_| self.timeline.state() == TimelineState::Finished || self.timeline.log().is_empty())
            .map(|f| f.to_string());
        let status = StatusRenderData {
            message: &self.status_message,
            state: self.timeline.state(),
            total_steps: self.timeline.log().len(),
            is_playing: self.timeline.is_playing(),
            speed_label: self
                .timeline
                .speed()
                .map_or_else(|| format!("{}ms", self.timeline.interval().as_millis()), |s| s.to_string()),
            fault: fault.as_deref(),
        };
        panes::render_status_bar(frame, main_chunks[1], &status);
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.timeline.pause();
                let n = c.to_digit(10).unwrap_or(1);
                let stepped = (0..n).take_while(|_| self.timeline.step_forward()).count();
                self.log_follow = true;
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.timeline.pause();
                self.log_follow = true;
                self.status_message = if self.timeline.step_back() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the start".to_string()
                };
            }
            KeyCode::Right => {
                self.timeline.pause();
                self.log_follow = true;
                self.status_message = if self.timeline.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the end".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Containers => {
                    self.containers_scroll = self.containers_scroll.saturating_sub(1);
                }
                FocusedPane::Log => {
                    self.log_follow = false;
                    self.log_scroll = self.log_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Containers => {
                    self.containers_scroll = self.containers_scroll.saturating_add(1);
                }
                FocusedPane::Log => {
                    self.log_follow = false;
                    self.log_scroll = self.log_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = now;
                    if self.timeline.is_playing() {
                        self.timeline.pause();
                        self.status_message = "Paused".to_string();
                    } else {
                        self.timeline.run(now);
                        self.log_follow = true;
                        self.status_message = "Playing...".to_string();
                    }
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_speed(self.speed.faster(), now),
            KeyCode::Char('-') | KeyCode::Char('_') => self.change_speed(self.speed.slower(), now),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.timeline.reset();
                self.log_follow = true;
                self.status_message = "Reset".to_string();
            }
            KeyCode::Enter => {
                self.timeline.jump_to_end();
                self.log_follow = true;
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.timeline.jump_to(None);
                self.log_follow = true;
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    fn change_speed(&mut self, speed: PlaybackSpeed, now: Instant) {
        self.speed = speed;
        self.timeline.set_speed(speed.interval(), now);
        self.status_message = format!("Speed {}", speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app(source: &str) -> App {
        let execution = crate::trace_with(source, &Default::default());
        App::new(Timeline::new(execution.log), source.to_string(), execution.fault)
    }

    #[test]
    fn test_stepping_keys() {
        let mut app = app("stack<int> s;\ns.push(1);\ns.push(2);\ns.pop();");
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.timeline.cursor(), Some(1));
        assert_eq!(app.current_line(), (Some(3), false));

        press(&mut app, KeyCode::Left);
        assert_eq!(app.timeline.cursor(), Some(0));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.timeline.state(), TimelineState::Finished);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.timeline.state(), TimelineState::Idle);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.timeline.cursor(), Some(2));
    }

    #[test]
    fn test_speed_keys_saturate() {
        let mut app = app("stack<int> s;");
        for _ in 0..10 {
            press(&mut app, KeyCode::Char('+'));
        }
        assert_eq!(app.speed, PlaybackSpeed::Quadruple);
        assert_eq!(app.timeline.interval(), Duration::from_millis(125));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.speed, PlaybackSpeed::Double);
    }

    #[test]
    fn test_fault_line_shown_at_end() {
        let mut app = app("stack<int> s;\ns.push(1);\ns.push(nope);");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_line(), (Some(3), true));
    }

    #[test]
    fn test_highlighted_item_follows_push() {
        let mut app = app("stack<int> s;\ns.push(1);\ns.push(2);");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.highlighted_item(), Some(ItemId(2)));
    }
}
