//! Main dashboard layout

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::actors::messages::PollKind;
use crate::projection::{DashboardView, Route};
use crate::store::DashboardState;
use crate::viewer::state::{InputMode, ViewerState};
use crate::NotificationKind;

use super::{details, home};

/// Render the main dashboard UI
pub fn render(frame: &mut Frame, ui: &ViewerState, state: &DashboardState, view: &DashboardView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], ui, view);

    match &ui.route {
        Route::Home => home::render(frame, chunks[1], ui, state, view),
        Route::Details(_) => details::render(frame, chunks[1], view),
    }

    render_footer(frame, chunks[2], ui, state);
}

/// Render header with title and the notification banner
fn render_header(frame: &mut Frame, area: Rect, ui: &ViewerState, view: &DashboardView) {
    let title = match &ui.route {
        Route::Home => "Sensor Data Dashboard".to_string(),
        Route::Details(device_id) => format!("Details for Chip ID: {}", device_id),
    };

    let mut line = vec![Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(notification) = &view.notification {
        let color = match notification.kind {
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
        };

        line.push(Span::raw("   "));
        line.push(Span::styled(
            format!(" {} ", notification.message),
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        ));
        line.push(Span::styled(" [x]", Style::default().fg(Color::DarkGray)));
    }

    let header = Paragraph::new(Line::from(line)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// Render footer with keybindings and poll status
fn render_footer(frame: &mut Frame, area: Rect, ui: &ViewerState, state: &DashboardState) {
    let mut footer_text = if ui.input_mode == InputMode::EditingThreshold {
        vec![
            Span::styled("EDITING", Style::default().fg(Color::Yellow)),
            Span::raw(" | Done: "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
        ]
    } else {
        vec![
            Span::raw("Select: "),
            Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
            Span::raw(" | Details: "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" | Back: "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" | Threshold: "),
            Span::styled("E", Style::default().fg(Color::Yellow)),
            Span::raw(" | Toggle: "),
            Span::styled("T", Style::default().fg(Color::Yellow)),
            Span::raw(" | Set Alert: "),
            Span::styled("S", Style::default().fg(Color::Yellow)),
            Span::raw(" | Quit: "),
            Span::styled("Q", Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
        ]
    };

    for kind in PollKind::ALL {
        let status = state.poll_status(kind);
        let (symbol, color) = if status.is_live() {
            ("●", Color::Green)
        } else if status.last_success.is_some() {
            ("◐", Color::Yellow)
        } else {
            ("○", Color::Red)
        };

        footer_text.push(Span::styled(
            format!("{} {} ", symbol, kind.title()),
            Style::default().fg(color),
        ));
    }

    if let Some(error) = &state.poll_status(PollKind::Readings).last_error {
        footer_text.push(Span::raw("| "));
        footer_text.push(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        ));
    }

    let footer =
        Paragraph::new(Line::from(footer_text)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
