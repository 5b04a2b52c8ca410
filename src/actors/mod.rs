//! Actors driving the dashboard's live data
//!
//! Each poller runs as an independent async task controlled through an mpsc
//! command channel, the same way every long-running component here is built.
//!
//! ## Data Flow
//!
//! ```text
//!   PollerActor(readings) ─┐
//!   PollerActor(history)  ─┼─ Snapshot ──▶ SyncStore ──▶ watch ──▶ projection ──▶ UI
//!   PollerActor(aggregate)─┘                  ▲
//!                                              │ notification / acknowledged rule
//!   AlertDispatcher ── POST /set-alert ────────┘
//! ```
//!
//! ## Actor Types
//!
//! - **PollerActor**: Fetches one endpoint at a fixed interval, drops stale resolutions
//! - **AlertDispatcher**: Submits alert rules and resolves them into a notification

pub mod dispatcher;
pub mod messages;
pub mod poller;
