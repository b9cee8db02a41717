//! UI layer for desktop GUI: app shell and tab panels.

pub mod app;
pub mod panels;

pub use app::{DesktopGuiApp, StartupConfig};
