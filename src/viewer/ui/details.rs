//! Details screen: history chart of one device

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::projection::DashboardView;

use super::widgets::render_history_chart;

/// Render details screen
pub fn render(frame: &mut Frame, area: Rect, view: &DashboardView) {
    match &view.detail {
        Some(detail) if !detail.chart.is_empty() => {
            render_history_chart(frame, area, &detail.chart);
        }
        Some(detail) => {
            let message = Paragraph::new(format!("No history for {} yet", detail.device_id))
                .block(Block::default().borders(Borders::ALL).title("History"))
                .style(Style::default().fg(Color::Gray));

            frame.render_widget(message, area);
        }
        None => {
            let message = Paragraph::new("No device selected")
                .block(Block::default().borders(Borders::ALL).title("History"))
                .style(Style::default().fg(Color::Gray));

            frame.render_widget(message, area);
        }
    }
}
