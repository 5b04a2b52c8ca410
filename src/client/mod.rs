//! Telemetry backend client
//!
//! The dashboard consumes four endpoints of the telemetry backend:
//!
//! | Method | Path                   | Used by           |
//! |--------|------------------------|-------------------|
//! | GET    | `/sensor-data`         | readings poller   |
//! | GET    | `/sensor-history`      | history poller    |
//! | GET    | `/average-temperature` | aggregate poller  |
//! | POST   | `/set-alert`           | alert dispatcher  |
//!
//! Everything above the HTTP layer talks to the [`TelemetrySource`] trait so the
//! pollers and the dispatcher can be driven by scripted sources in tests.

pub mod error;
mod http;

use async_trait::async_trait;

use crate::actors::messages::{PollKind, Snapshot};
use crate::{AlertRule, HistorySnapshot, ReadingsSnapshot};

pub use error::{ClientError, ClientResult};
pub use http::HttpTelemetryClient;

/// Source of telemetry snapshots and sink for alert-rule commands
///
/// Implementations must be `Send + Sync`; a single instance is shared by all
/// pollers and the dispatcher.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the current reading of every known device
    async fn fetch_readings(&self) -> ClientResult<ReadingsSnapshot>;

    /// Fetch the full history of every known device
    async fn fetch_history(&self) -> ClientResult<HistorySnapshot>;

    /// Fetch the backend-computed average temperature
    ///
    /// Returns [`ClientError::NoData`] when the backend has nothing to average.
    async fn fetch_average_temperature(&self) -> ClientResult<f64>;

    /// Submit an alert rule; `Ok` means the backend acknowledged it
    async fn set_alert(&self, rule: &AlertRule) -> ClientResult<()>;

    /// Fetch the snapshot belonging to a poll kind
    async fn fetch(&self, kind: PollKind) -> ClientResult<Snapshot> {
        match kind {
            PollKind::Readings => self.fetch_readings().await.map(Snapshot::Readings),
            PollKind::History => self.fetch_history().await.map(Snapshot::History),
            PollKind::Aggregate => self
                .fetch_average_temperature()
                .await
                .map(Snapshot::Aggregate),
        }
    }
}
