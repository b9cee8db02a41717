//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::Command;
use shared::domain::ProjectId;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    Execute(Command),
    /// Read a file picked for `project_id`; the worker answers with `UiEvent::UploadReady`.
    ReadUpload { project_id: ProjectId, path: PathBuf },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Execute(command) => command.name(),
            Self::ReadUpload { .. } => "read_upload",
        }
    }
}
