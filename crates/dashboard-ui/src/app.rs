//! Application state and event loop for the interactive dashboard.
//!
//! [`App`] owns the cleaned dataset (read-only after load), the current
//! filter parameters and the snapshot derived from them. Every filter change
//! rebuilds the snapshot from scratch.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, info};

use dashboard_core::models::CleanedIncident;
use dashboard_core::{DashboardError, Result};
use dashboard_data::analysis::{build_snapshot, distinct_descriptions, DashboardQuery, DashboardSnapshot};

use crate::components::header::Header;
use crate::themes::Theme;
use crate::{chart_view, map_view, table_view};

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which tab the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Tab {
    Records,
    Trends,
    Map,
}

impl Tab {
    fn index(self) -> usize {
        Tab::iter().position(|t| t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        match self {
            Tab::Records => Tab::Trends,
            Tab::Trends => Tab::Map,
            Tab::Map => Tab::Records,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    /// Cleaned dataset; never mutated after construction.
    incidents: Vec<CleanedIncident>,
    /// Distinct descriptions in first-appearance order, for crime cycling.
    pub descriptions: Vec<String>,
    pub query: DashboardQuery,
    pub snapshot: DashboardSnapshot,
    /// First visible row of the records table.
    pub offset: usize,
    pub should_quit: bool,
}

impl App {
    /// Build the app and its first snapshot.
    pub fn new(theme_name: &str, incidents: Vec<CleanedIncident>, query: DashboardQuery) -> Self {
        let descriptions = distinct_descriptions(&incidents);
        let snapshot = build_snapshot(&incidents, &query);
        Self {
            theme: Theme::from_name(theme_name),
            tab: Tab::Records,
            incidents,
            descriptions,
            query,
            snapshot,
            offset: 0,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Input is polled with a 250 ms timeout; each handled key completes its
    /// recomputation before the next key is read.
    pub fn run(mut self) -> Result<()> {
        enable_raw_mode().map_err(terminal_error("enable raw mode"))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(terminal_error("enter alternate screen"))?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(terminal_error("create terminal"))?;

        let tick_rate = Duration::from_millis(250);

        let result: io::Result<()> = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode().map_err(terminal_error("disable raw mode"))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(terminal_error("leave alternate screen"))?;
        terminal.show_cursor().map_err(terminal_error("show cursor"))?;

        info!("Dashboard closed");
        result.map_err(terminal_error("event loop"))
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Char('c') => self.cycle_crime(true),
            KeyCode::Char('C') => self.cycle_crime(false),
            KeyCode::Char(']') => self.shift_window(1),
            KeyCode::Char('[') => self.shift_window(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll(-1),
            KeyCode::PageDown => self.scroll(20),
            KeyCode::PageUp => self.scroll(-20),
            _ => {}
        }
    }

    /// Move the highlighted crime to the next (or previous) distinct
    /// description.
    pub fn cycle_crime(&mut self, forward: bool) {
        if self.descriptions.is_empty() {
            return;
        }
        let len = self.descriptions.len();
        let next = match self
            .descriptions
            .iter()
            .position(|d| *d == self.query.highlighted)
        {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.query.highlighted = self.descriptions[next].clone();
        self.refresh();
    }

    /// Shift both window ends by `months`.
    pub fn shift_window(&mut self, months: i32) {
        self.query.window = self.query.window.shift_months(months);
        self.offset = 0;
        self.refresh();
    }

    fn scroll(&mut self, delta: i64) {
        let max = self.snapshot.records.len().saturating_sub(1);
        let next = (self.offset as i64 + delta).clamp(0, max as i64);
        self.offset = next as usize;
    }

    /// Rebuild the snapshot from the cleaned dataset and current query.
    pub fn refresh(&mut self) {
        debug!(
            "Recomputing snapshot for {} / {:?}",
            self.query.window, self.query.highlighted
        );
        self.snapshot = build_snapshot(&self.incidents, &self.query);
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let header = Header::new(
            self.query.window.to_string(),
            &self.query.highlighted,
            self.snapshot.records.len(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);

        let titles: Vec<String> = Tab::iter().map(|t| t.to_string()).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active);
        frame.render_widget(tabs, chunks[1]);

        let body = chunks[2];
        if self.snapshot.is_empty() {
            table_view::render_no_data(frame, body, &self.theme);
        } else {
            match self.tab {
                Tab::Records => table_view::render_records_tab(
                    frame,
                    body,
                    &self.snapshot.records,
                    &self.snapshot.description_counts,
                    self.offset,
                    &self.theme,
                ),
                Tab::Trends => chart_view::render_trends_tab(
                    frame,
                    body,
                    &self.snapshot.monthly_totals,
                    &self.snapshot.composition,
                    &self.theme,
                ),
                Tab::Map => map_view::render_map(
                    frame,
                    body,
                    &self.snapshot.map_points,
                    self.snapshot.map_center,
                    &self.query.highlighted,
                    &self.theme,
                ),
            }
        }

        let help = Line::from(vec![Span::styled(
            " Tab: switch view  c/C: crime  [/]: month  ↑/↓: scroll  q: quit ",
            self.theme.dim,
        )]);
        frame.render_widget(Paragraph::new(help), chunks[3]);
    }
}

/// Wrap a terminal I/O failure with the step that produced it.
fn terminal_error(step: &'static str) -> impl FnOnce(io::Error) -> DashboardError {
    move |e| DashboardError::Terminal(format!("{step}: {e}"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
