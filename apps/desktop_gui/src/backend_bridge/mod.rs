//! Backend worker: owns the HTTP client and a tokio runtime off the UI thread.

pub mod commands;
pub mod runtime;
