//! PollerActor - Periodically fetches one backend endpoint
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick ─▶ seq += 1 ─▶ spawn fetch(seq) ─▶ JoinSet ─▶ SequenceGuard ─▶ PollSink
//!     ↑
//!     └─── Commands (PollNow, UpdateInterval, Shutdown)
//! ```
//!
//! Fetches run concurrently with the timer, so a slow backend never delays the
//! next tick. Because of that, resolutions can arrive out of issue order; the
//! [`SequenceGuard`] drops every resolution, success or failure, that is not
//! strictly newer than the last one that resolved.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tracing::{debug, instrument, trace, warn};

use crate::client::{ClientError, ClientResult, TelemetrySource};
use crate::config::DashboardConfig;

use super::messages::{PollKind, PollerCommand, Snapshot};

/// Receiver of poll results
///
/// Callbacks are invoked from the poller task, never after the poller stopped.
pub trait PollSink: Send + Sync {
    /// A fresh snapshot that passed the ordering guard
    fn accept(&self, snapshot: Snapshot);

    /// A fetch failed; prior data must stay untouched
    fn reject(&self, kind: PollKind, error: &ClientError);
}

/// Tracks the newest resolved request sequence of one poll kind
///
/// A failed request counts as resolved: once it has failed, an older request
/// that succeeds later must not make the loop look fresh again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceGuard {
    last_resolved: Option<u64>,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `seq` as resolved if it is strictly newer than anything resolved so far
    pub fn admit(&mut self, seq: u64) -> bool {
        if self.is_stale(seq) {
            return false;
        }

        self.last_resolved = Some(seq);
        true
    }

    /// Whether a request with `seq` has been overtaken by a newer resolved one
    pub fn is_stale(&self, seq: u64) -> bool {
        self.last_resolved.is_some_and(|last| seq <= last)
    }

    pub fn last_resolved(&self) -> Option<u64> {
        self.last_resolved
    }
}

/// Reject intervals `tokio::time::interval` cannot tick with
fn validate_interval(kind: PollKind, interval: Duration) -> Result<()> {
    if interval.is_zero() {
        bail!("{kind} poll interval must be greater than zero");
    }
    Ok(())
}

/// Actor that polls a single endpoint
pub struct PollerActor {
    kind: PollKind,

    source: Arc<dyn TelemetrySource>,

    sink: Arc<dyn PollSink>,

    command_rx: mpsc::Receiver<PollerCommand>,

    interval_duration: Duration,

    /// Sequence number of the most recently issued fetch
    issued: u64,

    guard: SequenceGuard,

    in_flight: JoinSet<(u64, ClientResult<Snapshot>)>,
}

impl PollerActor {
    pub fn new(
        kind: PollKind,
        interval_duration: Duration,
        source: Arc<dyn TelemetrySource>,
        sink: Arc<dyn PollSink>,
        command_rx: mpsc::Receiver<PollerCommand>,
    ) -> Self {
        Self {
            kind,
            source,
            sink,
            command_rx,
            interval_duration,
            issued: 0,
            guard: SequenceGuard::new(),
            in_flight: JoinSet::new(),
        }
    }

    /// Run the actor's main loop
    ///
    /// The first fetch is issued immediately. The loop runs until a Shutdown
    /// command arrives or every handle has been dropped; in-flight fetches are
    /// aborted on exit and their results are never delivered.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn run(mut self) {
        debug!("starting poller");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.issue();
                }

                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    match joined {
                        Ok((seq, result)) => self.resolve(seq, result),
                        Err(e) if e.is_cancelled() => trace!("fetch task cancelled"),
                        Err(e) => warn!("fetch task failed: {e}"),
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(PollerCommand::PollNow) => {
                            debug!("received PollNow command");
                            self.issue();
                        }

                        Some(PollerCommand::UpdateInterval { interval }) => {
                            debug!("updating interval to {interval:?}");
                            self.interval_duration = interval;
                            ticker = interval_at(Instant::now() + interval, interval);
                            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        }

                        Some(PollerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        self.in_flight.abort_all();
        debug!("poller stopped");
    }

    fn issue(&mut self) {
        self.issued += 1;
        let seq = self.issued;
        let kind = self.kind;
        let source = Arc::clone(&self.source);

        trace!(seq, "issuing fetch");

        self.in_flight
            .spawn(async move { (seq, source.fetch(kind).await) });
    }

    fn resolve(&mut self, seq: u64, result: ClientResult<Snapshot>) {
        if !self.guard.admit(seq) {
            debug!(
                seq,
                last_resolved = ?self.guard.last_resolved(),
                ok = result.is_ok(),
                "dropping stale resolution"
            );
            return;
        }

        match result {
            Ok(snapshot) => {
                trace!(seq, "applying snapshot");
                self.sink.accept(snapshot);
            }
            Err(e) => {
                match &e {
                    ClientError::NoData => debug!(seq, "backend has no data yet"),
                    _ => warn!(seq, "poll failed: {e}"),
                }

                self.sink.reject(self.kind, &e);
            }
        }
    }
}

/// Handle for controlling a PollerActor
///
/// Dropping every handle also stops the actor.
pub struct PollerHandle {
    sender: mpsc::Sender<PollerCommand>,

    kind: PollKind,

    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Spawn a new poller actor on the current tokio runtime
    ///
    /// Fails without spawning anything if `interval` is zero.
    pub fn spawn(
        kind: PollKind,
        interval: Duration,
        source: Arc<dyn TelemetrySource>,
        sink: Arc<dyn PollSink>,
    ) -> Result<Self> {
        validate_interval(kind, interval)?;

        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = PollerActor::new(kind, interval, source, sink, cmd_rx);
        let task = tokio::spawn(actor.run());

        Ok(Self {
            sender: cmd_tx,
            kind,
            task,
        })
    }

    pub fn kind(&self) -> PollKind {
        self.kind
    }

    /// Issue an extra fetch without waiting for the next tick
    pub async fn poll_now(&self) -> Result<()> {
        self.sender
            .send(PollerCommand::PollNow)
            .await
            .context("failed to send PollNow command")?;
        Ok(())
    }

    /// Update the polling interval; a zero interval is rejected and the old one kept
    pub async fn update_interval(&self, interval: Duration) -> Result<()> {
        validate_interval(self.kind, interval)?;

        self.sender
            .send(PollerCommand::UpdateInterval { interval })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    /// Stop the poller and wait until it exited
    ///
    /// Once this returns, the sink receives no further callbacks.
    pub async fn shutdown(self) -> Result<()> {
        // The actor may already be gone; the join below still applies
        let _ = self.sender.send(PollerCommand::Shutdown).await;

        self.task
            .await
            .with_context(|| format!("{} poller task failed", self.kind))?;
        Ok(())
    }

    /// Stop the poller without waiting
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// The set of pollers feeding one dashboard
///
/// Acquired when the dashboard is shown and released when it goes away; if the
/// session is dropped without [`PollingSession::shutdown`], all pollers are aborted.
pub struct PollingSession {
    handles: Vec<PollerHandle>,
}

impl PollingSession {
    /// Start one poller per [`PollKind`] with the configured intervals
    ///
    /// Every interval is checked before the first poller is spawned.
    pub fn start(
        config: &DashboardConfig,
        source: Arc<dyn TelemetrySource>,
        sink: Arc<dyn PollSink>,
    ) -> Result<Self> {
        for kind in PollKind::ALL {
            validate_interval(kind, config.interval_for(kind))?;
        }

        let handles = PollKind::ALL
            .into_iter()
            .map(|kind| {
                PollerHandle::spawn(
                    kind,
                    config.interval_for(kind),
                    Arc::clone(&source),
                    Arc::clone(&sink),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { handles })
    }

    pub fn handle(&self, kind: PollKind) -> Option<&PollerHandle> {
        self.handles.iter().find(|h| h.kind() == kind)
    }

    /// Trigger an immediate fetch on every poller
    pub async fn poll_all_now(&self) -> Result<()> {
        for handle in &self.handles {
            handle.poll_now().await?;
        }
        Ok(())
    }

    /// Stop all pollers and wait for them to exit
    ///
    /// Every poller is stopped even if one of them fails; the first failure is
    /// returned once all of them are gone.
    pub async fn shutdown(mut self) -> Result<()> {
        let handles = std::mem::take(&mut self.handles);
        let mut first_error = None;

        for handle in handles {
            if let Err(e) = handle.shutdown().await {
                warn!("{e:#}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for PollingSession {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
