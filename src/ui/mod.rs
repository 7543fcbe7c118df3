//! UI rendering module for the Bold East Africa reader
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod article;
pub mod feed;
pub mod help_overlay;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};
use crate::screens::ScreenState;

/// Color scheme shared by every view
pub(crate) mod colors {
    use ratatui::style::Color;

    /// Masthead and section headers
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Hints and separators
    pub const MUTED: Color = Color::DarkGray;
    /// Selection cursor, key names, headline marker
    pub const ACCENT: Color = Color::Yellow;
    /// Hyperlinks
    pub const LINK: Color = Color::Blue;
    /// Offline and error status
    pub const WARNING: Color = Color::Red;
    /// Prime (premium) marker
    pub const PRIME: Color = Color::Magenta;
}

/// Renders the whole frame for the current app state
pub fn render(frame: &mut Frame, app: &App) {
    let view = app.view();
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Screen
            Constraint::Length(1), // Status and key hints
        ])
        .split(area);

    if view.is_loading() {
        render_loading(frame, chunks[0]);
    } else {
        match &view {
            View::Home(state) => feed::render_home(frame, app, state, chunks[0]),
            View::Category(state) => feed::render_category(frame, app, state, chunks[0]),
            View::Article(state) => article::render(frame, app, state, chunks[0]),
        }
    }

    frame.render_widget(Paragraph::new(status_line(app, &view)), chunks[1]);

    if app.picker.is_some() {
        feed::render_picker(frame, app);
    }
    if app.show_help {
        help_overlay::render(frame);
    }
}

/// Renders a loading message while the first pass is in flight
pub fn render_loading(frame: &mut Frame, area: Rect) {
    let message = Paragraph::new("Loading the latest stories...")
        .style(Style::default().fg(colors::HEADER))
        .alignment(Alignment::Center);
    frame.render_widget(message, middle_row(area));
}

/// Renders the "not found" state for a screen whose target does not exist
pub fn render_not_found(frame: &mut Frame, area: Rect, what: &str) {
    let lines = vec![
        Line::from(Span::styled(
            format!("{} not found", what),
            Style::default()
                .fg(colors::WARNING)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Press Esc to go back",
            Style::default().fg(colors::MUTED),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        middle_row(area),
    );
}

fn middle_row(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area)[1]
}

/// Describes how fresh the shown data is
pub fn freshness<M>(state: &ScreenState<M>) -> String {
    if let Some(at) = state.refreshed_at {
        return format!("Updated {}", format_clock(at));
    }
    if state.from_cache {
        return "Cached copy".to_string();
    }
    String::new()
}

fn format_clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

fn status_line(app: &App, view: &View) -> Line<'static> {
    let (fresh, error) = match view {
        View::Home(state) => (freshness(state), state.last_error.clone()),
        View::Category(state) => (freshness(state), state.last_error.clone()),
        View::Article(state) => (freshness(state), state.last_error.clone()),
    };

    let mut spans = Vec::new();
    if !app.is_online() {
        spans.push(Span::styled("OFFLINE ", Style::default().fg(colors::WARNING)));
    }
    if let Some(error) = error {
        spans.push(Span::styled(
            format!("{} ", error),
            Style::default().fg(colors::WARNING),
        ));
    }
    if !fresh.is_empty() {
        spans.push(Span::styled(
            format!("{}  ", fresh),
            Style::default().fg(colors::SECONDARY),
        ));
    }
    spans.push(Span::styled(
        "? help  c categories  r refresh  q quit",
        Style::default().fg(colors::MUTED),
    ));
    Line::from(spans)
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height.min(area.height)),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width.min(area.width)),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Collects every cell symbol of a rendered buffer, for assertions
#[cfg(test)]
pub(crate) fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}
