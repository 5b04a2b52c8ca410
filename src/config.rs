//! Dashboard configuration

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actors::messages::PollKind;

/// How the details screen picks the device it shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailSelection {
    /// Show the device the operator selected
    #[default]
    Clicked,

    /// Always show the first device of the current readings, whichever was selected
    FirstDevice,
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Telemetry backend base URL
    #[serde(default = "crate::util::get_default_api_url")]
    pub api_url: String,

    /// Current readings poll interval in milliseconds (default: 2000)
    #[serde(default = "default_interval_ms")]
    pub readings_interval_ms: u64,

    /// History poll interval in milliseconds (default: 2000)
    #[serde(default = "default_interval_ms")]
    pub history_interval_ms: u64,

    /// Average temperature poll interval in milliseconds (default: 2000)
    #[serde(default = "default_interval_ms")]
    pub aggregate_interval_ms: u64,

    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub detail_selection: DetailSelection,

    /// Enable debug logging (default: false)
    #[serde(default)]
    pub debug: bool,
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    10
}

impl DashboardConfig {
    /// Load configuration from file, or use defaults if no file exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(|p| p.to_path_buf()).or_else(|| {
            let default_path = dirs::config_dir()?
                .join("sensor-dashboard")
                .join("viewer.toml");
            default_path.exists().then_some(default_path)
        });

        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
            .inspect(|config| trace!("loaded config: {config:?}"))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;

        if PollKind::ALL
            .iter()
            .any(|kind| config.interval_for(*kind).is_zero())
        {
            anyhow::bail!("poll intervals must be greater than zero");
        }

        Ok(config)
    }

    pub fn interval_for(&self, kind: PollKind) -> Duration {
        let millis = match kind {
            PollKind::Readings => self.readings_interval_ms,
            PollKind::History => self.history_interval_ms,
            PollKind::Aggregate => self.aggregate_interval_ms,
        };

        Duration::from_millis(millis)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: crate::util::get_default_api_url(),
            readings_interval_ms: default_interval_ms(),
            history_interval_ms: default_interval_ms(),
            aggregate_interval_ms: default_interval_ms(),
            request_timeout_secs: default_request_timeout(),
            detail_selection: DetailSelection::default(),
            debug: false,
        }
    }
}
