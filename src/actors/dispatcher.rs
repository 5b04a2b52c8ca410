//! AlertDispatcher - Submits alert rules to the backend
//!
//! Every submission is a single attempt: no retry and no optimistic update.
//! Its outcome is turned into exactly one notification, and only an
//! acknowledged submission becomes the store's acknowledged rule. Submissions
//! may overlap; the backend keeps whichever write reached it last.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::AlertRule;
use crate::client::TelemetrySource;
use crate::store::SyncStore;

use super::messages::AlertOutcome;

/// Write path for operator commands
#[derive(Clone)]
pub struct AlertDispatcher {
    source: Arc<dyn TelemetrySource>,

    store: SyncStore,

    /// Sequence number of the most recent submission
    submitted: Arc<AtomicU64>,
}

impl AlertDispatcher {
    pub fn new(source: Arc<dyn TelemetrySource>, store: SyncStore) -> Self {
        Self {
            source,
            store,
            submitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submit `draft` and wait for its outcome
    ///
    /// A non-finite threshold is sent as is (it serializes as JSON `null`) and
    /// left to the backend to reject.
    #[instrument(skip(self), fields(threshold = draft.threshold_celsius, enabled = draft.enabled))]
    pub async fn submit(&self, draft: AlertRule) -> AlertOutcome {
        let seq = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "submitting alert rule");

        let outcome = match self.source.set_alert(&draft).await {
            Ok(()) => {
                debug!(seq, "alert rule accepted");
                AlertOutcome::Accepted
            }
            Err(e) => {
                error!(seq, "failed to update alert settings: {e}");
                AlertOutcome::Rejected
            }
        };

        self.store.record_alert_outcome(seq, draft, outcome);
        outcome
    }

    /// Submit `draft` without blocking the caller
    pub fn submit_in_background(&self, draft: AlertRule) -> JoinHandle<AlertOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.submit(draft).await })
    }
}
