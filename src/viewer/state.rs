//! Viewer-local UI state
//!
//! Only what the operator is doing lives here (screen, selection, text being
//! typed). Everything received from the backend lives in the store.

use crate::config::DetailSelection;
use crate::projection::{Route, navigate};
use crate::store::DashboardState;
use crate::util::coerce_threshold;
use crate::{AlertRule, DeviceId};

/// Whether key presses edit the threshold field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    EditingThreshold,
}

/// UI state of the viewer
#[derive(Debug, Clone)]
pub struct ViewerState {
    /// Current screen
    pub route: Route,

    /// Selected device index on the home screen
    pub selected_device: usize,

    pub input_mode: InputMode,

    /// Threshold text exactly as typed
    pub threshold_input: String,

    pub alerts_enabled: bool,
}

impl ViewerState {
    pub fn new() -> Self {
        Self {
            route: Route::Home,
            selected_device: 0,
            input_mode: InputMode::Normal,
            threshold_input: "0".to_string(),
            alerts_enabled: false,
        }
    }

    /// Select next device, wrapping around
    pub fn select_next(&mut self, device_count: usize) {
        if device_count > 0 {
            self.selected_device = (self.selected_device + 1) % device_count;
        }
    }

    /// Select previous device, wrapping around
    pub fn select_previous(&mut self, device_count: usize) {
        if device_count > 0 {
            self.selected_device = if self.selected_device == 0 {
                device_count - 1
            } else {
                self.selected_device - 1
            };
        }
    }

    /// Keep the selection inside the current device list
    pub fn clamp_selection(&mut self, device_count: usize) {
        if self.selected_device >= device_count && device_count > 0 {
            self.selected_device = device_count - 1;
        }
    }

    /// Device id under the cursor
    pub fn selected_device_id(&self, state: &DashboardState) -> Option<DeviceId> {
        state
            .device_ids()
            .nth(self.selected_device)
            .map(str::to_string)
    }

    /// Open the details screen for the device under the cursor
    pub fn open_details(&mut self, state: &DashboardState, selection: DetailSelection) {
        if let Some(clicked) = self.selected_device_id(state) {
            self.route = navigate(state, selection, &clicked);
        }
    }

    pub fn go_home(&mut self) {
        self.route = Route::Home;
    }

    /// Device the detail projection should use
    pub fn detail_device(&self) -> Option<&str> {
        match &self.route {
            Route::Details(device_id) => Some(device_id.as_str()),
            Route::Home => None,
        }
    }

    pub fn push_threshold_char(&mut self, c: char) {
        if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') {
            self.threshold_input.push(c);
        }
    }

    pub fn pop_threshold_char(&mut self) {
        self.threshold_input.pop();
    }

    pub fn toggle_alerts(&mut self) {
        self.alerts_enabled = !self.alerts_enabled;
    }

    /// Draft rule built from the current inputs
    pub fn draft(&self) -> AlertRule {
        AlertRule {
            threshold_celsius: coerce_threshold(&self.threshold_input),
            enabled: self.alerts_enabled,
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}
