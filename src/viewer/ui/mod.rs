//! UI rendering module

mod details;
mod home;
mod layout;
mod widgets;

pub use layout::render;
