pub mod actors;
pub mod client;
pub mod config;
pub mod projection;
pub mod store;
pub mod util;
pub mod viewer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable identifier of a physical sensor unit (the backend calls it a chip ID)
pub type DeviceId = String;

/// Current readings keyed by device, as returned by `GET /sensor-data`
pub type ReadingsSnapshot = BTreeMap<DeviceId, DeviceReading>;

/// Historical series keyed by device, as returned by `GET /sensor-history`
pub type HistorySnapshot = BTreeMap<DeviceId, Vec<HistoryPoint>>;

/// Latest reading reported by a single device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub temperature: f64,
    pub humidity: f64,
    /// Backend-formatted local time of the last report (`%Y-%m-%d %H:%M:%S`)
    #[serde(rename = "lastLogTime")]
    pub last_log_time: String,
}

/// One entry of a device's history, ordered by time ascending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
}

/// Threshold alert rule as edited by the operator and sent to the backend
///
/// A value of this type is only a draft until the backend acknowledged it;
/// the store keeps the acknowledged rule in a separate field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    #[serde(rename = "threshold")]
    pub threshold_celsius: f64,
    pub enabled: bool,
}

impl Default for AlertRule {
    fn default() -> Self {
        Self {
            threshold_celsius: 0.0,
            enabled: false,
        }
    }
}

/// Notification kind, decides the banner color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient banner shown until dismissed or superseded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub const ALERT_UPDATED: &'static str = "Alert settings updated successfully!";
    pub const ALERT_FAILED: &'static str = "Failed to update alert settings.";

    pub fn alert_updated() -> Self {
        Self {
            message: Self::ALERT_UPDATED.to_string(),
            kind: NotificationKind::Success,
        }
    }

    pub fn alert_failed() -> Self {
        Self {
            message: Self::ALERT_FAILED.to_string(),
            kind: NotificationKind::Error,
        }
    }
}
