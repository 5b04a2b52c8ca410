//! View projection
//!
//! Pure derivation of everything the UI draws from a [`DashboardState`]
//! snapshot: gauges, the aggregate label, chart series and the notification
//! banner. Nothing here performs I/O or keeps state.

use chrono::{DateTime, NaiveDateTime};

use crate::config::DetailSelection;
use crate::store::DashboardState;
use crate::{DeviceId, DeviceReading, HistoryPoint, Notification};

/// Full scale of the temperature gauge in °C
pub const TEMPERATURE_GAUGE_MAX: f64 = 50.0;

/// Full scale of the humidity gauge in %
pub const HUMIDITY_GAUGE_MAX: f64 = 100.0;

/// Shown while the average temperature is still unknown
pub const AGGREGATE_PLACEHOLDER: &str = "Loading...";

const BACKEND_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Screen the dashboard is on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Details(DeviceId),
}

/// One gauge, fully computed
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeView {
    pub value: f64,
    pub max: f64,
    pub text: String,
}

impl GaugeView {
    fn new(value: f64, max: f64, unit: &str) -> Self {
        Self {
            value,
            max,
            text: format!("{}{}", value, unit),
        }
    }

    /// Fill ratio clamped to `0.0..=1.0`
    pub fn ratio(&self) -> f64 {
        if !self.value.is_finite() || self.max <= 0.0 {
            return 0.0;
        }
        (self.value / self.max).clamp(0.0, 1.0)
    }
}

/// Card shown per device on the home screen
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCard {
    pub device_id: DeviceId,
    pub last_log_time: String,
    pub temperature: GaugeView,
    pub humidity: GaugeView,
}

impl DeviceCard {
    fn from_reading(device_id: &str, reading: &DeviceReading) -> Self {
        Self {
            device_id: device_id.to_string(),
            last_log_time: reading.last_log_time.clone(),
            temperature: GaugeView::new(reading.temperature, TEMPERATURE_GAUGE_MAX, "°C"),
            humidity: GaugeView::new(reading.humidity, HUMIDITY_GAUGE_MAX, "%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: &'static str,
    pub points: Vec<f64>,
}

/// Time-series chart of one device
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    /// X axis labels, one per history point
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartView {
    fn from_history(history: &[HistoryPoint]) -> Self {
        Self {
            categories: history.iter().map(|p| time_label(&p.time)).collect(),
            series: vec![
                ChartSeries {
                    name: "Temperature (°C)",
                    points: history.iter().map(|p| p.temperature).collect(),
                },
                ChartSeries {
                    name: "Humidity (%)",
                    points: history.iter().map(|p| p.humidity).collect(),
                },
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub device_id: DeviceId,
    pub chart: ChartView,
}

/// Everything the UI renders
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub gauges: Vec<DeviceCard>,
    pub average_temperature: String,
    pub detail: Option<DetailView>,
    pub notification: Option<Notification>,
}

/// Format the aggregate metric, keeping "unknown" distinct from zero
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{:.2}°C", value),
        None => AGGREGATE_PLACEHOLDER.to_string(),
    }
}

/// Render a backend time as `HH:MM:SS`, or return it unchanged if unparseable
pub fn time_label(time: &str) -> String {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(time, BACKEND_TIME_FORMAT) {
        return parsed.format("%H:%M:%S").to_string();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(time) {
        return parsed.format("%H:%M:%S").to_string();
    }

    time.to_string()
}

/// Device the details screen shows
///
/// With [`DetailSelection::Clicked`] the selected device wins and the first
/// device is the default; with [`DetailSelection::FirstDevice`] the first
/// device is always used. A selected device may be absent from the readings.
pub fn resolve_detail_device(
    state: &DashboardState,
    selection: DetailSelection,
    selected: Option<&str>,
) -> Option<DeviceId> {
    match (selection, selected) {
        (DetailSelection::Clicked, Some(device_id)) => Some(device_id.to_string()),
        _ => state.first_device_id().map(str::to_string),
    }
}

/// Route taken when the operator opens the details of `clicked`
pub fn navigate(state: &DashboardState, selection: DetailSelection, clicked: &str) -> Route {
    let device_id = resolve_detail_device(state, selection, Some(clicked))
        .unwrap_or_else(|| clicked.to_string());
    Route::Details(device_id)
}

/// Project `state` into renderable data
///
/// `selected` is the device the detail view should show; `None` falls back to
/// the first device of the current readings.
pub fn project(
    state: &DashboardState,
    selection: DetailSelection,
    selected: Option<&str>,
) -> DashboardView {
    let gauges = state
        .readings
        .iter()
        .map(|(device_id, reading)| DeviceCard::from_reading(device_id, reading))
        .collect();

    let detail = resolve_detail_device(state, selection, selected).map(|device_id| DetailView {
        chart: ChartView::from_history(state.history_for(&device_id)),
        device_id,
    });

    DashboardView {
        gauges,
        average_temperature: format_average(state.average_temperature),
        detail,
        notification: state.notification.clone(),
    }
}
