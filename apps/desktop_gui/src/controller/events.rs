//! Events flowing from the backend worker to the UI thread.

use client_core::Outcome;
use shared::{domain::ProjectId, protocol::DocumentUpload};

pub enum UiEvent {
    Info(String),
    Outcome(Outcome),
    /// A file picked in `project_id` has been read and can be handed to the upload command.
    UploadReady {
        project_id: ProjectId,
        upload: DocumentUpload,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    QueueFull,
    WorkerDisconnected,
    Upload,
}

#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    /// The worker is gone; nothing more can be sent until the app restarts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.context,
            UiErrorContext::BackendStartup | UiErrorContext::WorkerDisconnected
        )
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
