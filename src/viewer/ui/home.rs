//! Home screen: alert editor, average temperature and device cards

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::projection::{DashboardView, DeviceCard};
use crate::store::DashboardState;
use crate::viewer::state::{InputMode, ViewerState};

use super::widgets::render_gauge;

const CARDS_PER_ROW: usize = 3;
const CARD_HEIGHT: u16 = 9;

/// Render home screen
pub fn render(
    frame: &mut Frame,
    area: Rect,
    ui: &ViewerState,
    state: &DashboardState,
    view: &DashboardView,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Alert editor + average
            Constraint::Min(0),    // Device cards
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    render_alert_panel(frame, top[0], ui, state);
    render_average_panel(frame, top[1], view);
    render_device_cards(frame, chunks[1], ui, view);
}

fn render_alert_panel(frame: &mut Frame, area: Rect, ui: &ViewerState, state: &DashboardState) {
    let editing = ui.input_mode == InputMode::EditingThreshold;

    let input_style = if editing {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let acknowledged = match &state.alert_acknowledged {
        Some(rule) => format!(
            "{}°C, {}",
            rule.threshold_celsius,
            if rule.enabled { "enabled" } else { "disabled" }
        ),
        None => "none".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Alert Threshold (°C): ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{}{}", ui.threshold_input, if editing { "_" } else { "" }),
                input_style,
            ),
        ]),
        Line::from(vec![
            Span::styled("Enable Alerts: ", Style::default().fg(Color::Cyan)),
            Span::raw(if ui.alerts_enabled { "[x]" } else { "[ ]" }),
        ]),
        Line::from(vec![
            Span::styled("Acknowledged: ", Style::default().fg(Color::DarkGray)),
            Span::styled(acknowledged, Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Alert Settings"),
    );

    frame.render_widget(panel, area);
}

fn render_average_panel(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let panel = Paragraph::new(Line::from(Span::styled(
        view.average_temperature.as_str(),
        Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Current Average Temperature"),
    );

    frame.render_widget(panel, area);
}

fn render_device_cards(frame: &mut Frame, area: Rect, ui: &ViewerState, view: &DashboardView) {
    if view.gauges.is_empty() {
        let message = Paragraph::new("Waiting for sensor data...")
            .block(Block::default().borders(Borders::ALL).title("Devices"))
            .style(Style::default().fg(Color::Gray));

        frame.render_widget(message, area);
        return;
    }

    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = ui.selected_device / CARDS_PER_ROW;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let rows: Vec<&[DeviceCard]> = view
        .gauges
        .chunks(CARDS_PER_ROW)
        .skip(first_row)
        .take(visible_rows)
        .collect();

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); rows.len()])
        .split(area);

    for (row_index, (cards, row_area)) in rows.iter().zip(row_areas.iter()).enumerate() {
        let card_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, CARDS_PER_ROW as u32);
                CARDS_PER_ROW
            ])
            .split(*row_area);

        for (column, (card, card_area)) in cards.iter().zip(card_areas.iter()).enumerate() {
            let index = (first_row + row_index) * CARDS_PER_ROW + column;
            render_device_card(frame, *card_area, card, index == ui.selected_device);
        }
    }
}

fn render_device_card(frame: &mut Frame, area: Rect, card: &DeviceCard, selected: bool) {
    let border_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("Chip ID: {}", card.device_id));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Last log time
            Constraint::Length(3), // Temperature
            Constraint::Length(3), // Humidity
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(format!("Last Log Time: {}", card.last_log_time))
            .style(Style::default().fg(Color::Gray)),
        chunks[0],
    );

    render_gauge(frame, chunks[1], "Temperature", &card.temperature, Color::Red);
    render_gauge(frame, chunks[2], "Humidity", &card.humidity, Color::Blue);
}
