//! Synchronizer / view-state store
//!
//! [`SyncStore`] is the single owner of everything the dashboard displays.
//! Pollers hand it snapshots, the alert dispatcher hands it submission
//! outcomes, and views read immutable [`DashboardState`] snapshots from it.
//!
//! ## Consistency
//!
//! State lives behind a `tokio::sync::watch` channel holding an
//! `Arc<DashboardState>`. Every write goes through `send_modify`, which
//! serializes writers; readers clone the `Arc` and therefore always observe a
//! complete state, never one torn across two applies. Writers copy the state
//! only while a reader still holds the previous snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::actors::messages::{AlertOutcome, PollKind, Snapshot};
use crate::actors::poller::PollSink;
use crate::client::ClientError;
use crate::{AlertRule, HistoryPoint, HistorySnapshot, Notification, ReadingsSnapshot};

/// Freshness of one polling loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollStatus {
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl PollStatus {
    fn record_success(&mut self) {
        self.last_success = Some(Utc::now());
        self.last_error = None;
        self.last_error_at = None;
        self.consecutive_failures = 0;
    }

    fn record_failure(&mut self, error: &ClientError) {
        self.last_error = Some(error.to_string());
        self.last_error_at = Some(Utc::now());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// At least one fetch succeeded and the latest one did not fail
    pub fn is_live(&self) -> bool {
        self.last_success.is_some() && self.consecutive_failures == 0
    }
}

/// Complete view state at one point in time
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Current reading per device; the latest snapshot decides which devices exist
    pub readings: ReadingsSnapshot,

    /// History per device, replaced independently of `readings`
    pub history: HistorySnapshot,

    /// Average temperature across devices; `None` until the first successful poll
    pub average_temperature: Option<f64>,

    /// Rule the operator is editing
    pub alert_draft: AlertRule,

    /// Last rule the backend acknowledged
    pub alert_acknowledged: Option<AlertRule>,

    acknowledged_seq: u64,

    /// Banner currently shown, at most one
    pub notification: Option<Notification>,

    readings_status: PollStatus,
    history_status: PollStatus,
    aggregate_status: PollStatus,
}

impl DashboardState {
    /// History of a device; empty when the latest history snapshot does not know it
    pub fn history_for(&self, device_id: &str) -> &[HistoryPoint] {
        self.history
            .get(device_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First device in iteration order (device ids sort ascending)
    pub fn first_device_id(&self) -> Option<&str> {
        self.readings.keys().next().map(String::as_str)
    }

    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.readings.keys().map(String::as_str)
    }

    pub fn poll_status(&self, kind: PollKind) -> &PollStatus {
        match kind {
            PollKind::Readings => &self.readings_status,
            PollKind::History => &self.history_status,
            PollKind::Aggregate => &self.aggregate_status,
        }
    }

    fn poll_status_mut(&mut self, kind: PollKind) -> &mut PollStatus {
        match kind {
            PollKind::Readings => &mut self.readings_status,
            PollKind::History => &mut self.history_status,
            PollKind::Aggregate => &mut self.aggregate_status,
        }
    }

    /// Whether the device readings are currently being refreshed successfully
    pub fn is_connected(&self) -> bool {
        self.readings_status.is_live()
    }
}

/// Shared handle to the view-state store
///
/// Cloning the handle shares the same underlying state.
#[derive(Debug, Clone)]
pub struct SyncStore {
    tx: Arc<watch::Sender<Arc<DashboardState>>>,
}

impl SyncStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(DashboardState::default()));
        Self { tx: Arc::new(tx) }
    }

    /// Consistent point-in-time read of the full state
    pub fn snapshot(&self) -> Arc<DashboardState> {
        Arc::clone(&self.tx.borrow())
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardState>> {
        self.tx.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut DashboardState)) {
        self.tx.send_modify(|state| apply(Arc::make_mut(state)));
    }

    /// Replace the readings wholesale; devices missing from `readings` disappear
    pub fn apply_readings_snapshot(&self, readings: ReadingsSnapshot) {
        trace!(devices = readings.len(), "applying readings snapshot");
        self.update(|state| {
            state.readings = readings;
            state.readings_status.record_success();
        });
    }

    /// Replace the history wholesale, independent of the readings
    pub fn apply_history_snapshot(&self, history: HistorySnapshot) {
        trace!(devices = history.len(), "applying history snapshot");
        self.update(|state| {
            state.history = history;
            state.history_status.record_success();
        });
    }

    pub fn apply_aggregate_metric(&self, average_temperature: f64) {
        trace!(average_temperature, "applying aggregate metric");
        self.update(|state| {
            state.average_temperature = Some(average_temperature);
            state.aggregate_status.record_success();
        });
    }

    /// Record a failed aggregate poll; the last known value stays visible
    pub fn apply_aggregate_failure(&self, error: &ClientError) {
        self.apply_failure(PollKind::Aggregate, error);
    }

    /// Record a failed poll of any kind without touching its data
    ///
    /// [`ClientError::NoData`] is not a failure: the backend answered, it just
    /// has nothing new, so the status is left as it was.
    pub fn apply_failure(&self, kind: PollKind, error: &ClientError) {
        if matches!(error, ClientError::NoData) {
            trace!(%kind, "no new data");
            return;
        }

        self.update(|state| state.poll_status_mut(kind).record_failure(error));
    }

    pub fn apply_snapshot(&self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Readings(readings) => self.apply_readings_snapshot(readings),
            Snapshot::History(history) => self.apply_history_snapshot(history),
            Snapshot::Aggregate(value) => self.apply_aggregate_metric(value),
        }
    }

    /// Replace the rule the operator is editing
    pub fn set_draft(&self, draft: AlertRule) {
        self.update(|state| state.alert_draft = draft);
    }

    pub fn dismiss_notification(&self) {
        self.update(|state| state.notification = None);
    }

    /// Record the outcome of alert submission number `seq`
    ///
    /// The notification always reflects the latest resolution. The acknowledged
    /// rule only moves forward, so a slow earlier submission cannot overwrite a
    /// newer acknowledged one.
    pub fn record_alert_outcome(&self, seq: u64, rule: AlertRule, outcome: AlertOutcome) {
        self.update(|state| {
            state.notification = Some(match outcome {
                AlertOutcome::Accepted => Notification::alert_updated(),
                AlertOutcome::Rejected => Notification::alert_failed(),
            });

            if outcome == AlertOutcome::Accepted && seq > state.acknowledged_seq {
                debug!(seq, "alert rule acknowledged");
                state.alert_acknowledged = Some(rule);
                state.acknowledged_seq = seq;
            }
        });
    }
}

impl Default for SyncStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PollSink for SyncStore {
    fn accept(&self, snapshot: Snapshot) {
        self.apply_snapshot(snapshot);
    }

    fn reject(&self, kind: PollKind, error: &ClientError) {
        self.apply_failure(kind, error);
    }
}
