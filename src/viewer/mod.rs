//! TUI Dashboard Module
//!
//! Terminal user interface showing live device gauges, history charts and the
//! alert-rule editor.

#[cfg(feature = "dashboard")]
mod app;
#[cfg(feature = "dashboard")]
mod state;
#[cfg(feature = "dashboard")]
mod ui;

#[cfg(feature = "dashboard")]
pub use app::App;
#[cfg(feature = "dashboard")]
pub use state::{InputMode, ViewerState};
