//! Message types for actor communication
//!
//! ## Design Principles
//!
//! 1. **Commands**: Control messages sent to a specific poller via mpsc
//! 2. **Snapshots**: Complete, authoritative backend responses handed to the store
//! 3. **Outcomes**: The resolved result of a user-issued command

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{HistorySnapshot, ReadingsSnapshot};

/// The independent polling loops of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollKind {
    /// Current reading per device
    Readings,
    /// Historical series per device
    History,
    /// Backend-computed average temperature
    Aggregate,
}

impl PollKind {
    pub const ALL: [PollKind; 3] = [PollKind::Readings, PollKind::History, PollKind::Aggregate];

    /// Backend path polled for this kind
    pub fn path(&self) -> &'static str {
        match self {
            PollKind::Readings => "/sensor-data",
            PollKind::History => "/sensor-history",
            PollKind::Aggregate => "/average-temperature",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PollKind::Readings => "Readings",
            PollKind::History => "History",
            PollKind::Aggregate => "Average",
        }
    }
}

impl fmt::Display for PollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PollKind::Readings => "readings",
            PollKind::History => "history",
            PollKind::Aggregate => "aggregate",
        })
    }
}

/// A complete point-in-time response of one polling endpoint
///
/// Snapshots are authoritative: applying one replaces all prior data of its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Readings(ReadingsSnapshot),
    History(HistorySnapshot),
    Aggregate(f64),
}

impl Snapshot {
    pub fn kind(&self) -> PollKind {
        match self {
            Snapshot::Readings(_) => PollKind::Readings,
            Snapshot::History(_) => PollKind::History,
            Snapshot::Aggregate(_) => PollKind::Aggregate,
        }
    }
}

/// Commands that can be sent to a PollerActor
#[derive(Debug)]
pub enum PollerCommand {
    /// Issue a fetch right away, in addition to the scheduled ticks
    PollNow,

    /// Replace the polling interval
    ///
    /// The next scheduled tick happens one full new interval from now.
    UpdateInterval { interval: Duration },

    /// Stop polling and abort all in-flight fetches
    Shutdown,
}

/// Resolution of an alert-rule submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// The backend acknowledged the rule
    Accepted,
    /// Transport failure or the backend rejected the rule
    Rejected,
}
