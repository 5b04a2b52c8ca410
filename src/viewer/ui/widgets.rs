//! Reusable UI widgets

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType},
};

use crate::projection::{ChartView, GaugeView, HUMIDITY_GAUGE_MAX, TEMPERATURE_GAUGE_MAX};

/// Render a single gauge
pub fn render_gauge(frame: &mut Frame, area: Rect, title: &str, gauge: &GaugeView, color: Color) {
    let widget = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
        .ratio(gauge.ratio())
        .label(Span::raw(gauge.text.as_str()));

    frame.render_widget(widget, area);
}

/// Render temperature and humidity history as a line chart
pub fn render_history_chart(frame: &mut Frame, area: Rect, chart: &ChartView) {
    let colors = [Color::Red, Color::Blue];

    let data: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|series| {
            series
                .points
                .iter()
                .enumerate()
                .map(|(i, value)| (i as f64, *value))
                .collect()
        })
        .collect();

    let datasets = chart
        .series
        .iter()
        .zip(data.iter())
        .zip(colors.iter().cycle())
        .map(|((series, points), color)| {
            Dataset::default()
                .name(series.name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect::<Vec<_>>();

    let [y_min, y_max] = value_bounds(data.iter().flatten().map(|(_, value)| *value));

    let x_max = (chart.categories.len().max(2) - 1) as f64;

    let x_labels = match (chart.categories.first(), chart.categories.last()) {
        (Some(first), Some(last)) => vec![first.clone(), last.clone()],
        _ => vec![],
    };

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Temperature (°C) / Humidity (%)"),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .labels(x_labels)
                .bounds([0.0, x_max]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .labels(vec![
                    format!("{:.0}", y_min),
                    format!("{:.0}", (y_min + y_max) / 2.0),
                    format!("{:.0}", y_max),
                ])
                .bounds([y_min, y_max]),
        );

    frame.render_widget(widget, area);
}

/// Y axis bounds covering every finite value
///
/// Humidity shares the axis, so the range always spans at least `0..=100`;
/// sub-zero temperatures extend it downwards.
fn value_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    values
        .filter(|value| value.is_finite())
        .fold([0.0, HUMIDITY_GAUGE_MAX.max(TEMPERATURE_GAUGE_MAX)], |[min, max], value| {
            [min.min(value), max.max(value)]
        })
}
