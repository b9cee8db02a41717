//! Command orchestration helpers from UI actions to backend command queue.

use std::{collections::VecDeque, path::PathBuf};

use client_core::{ClientError, Command, Outcome, ViewState};
use crossbeam_channel::{Sender, TrySendError};
use shared::domain::ProjectId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext};

const QUEUE_FULL_MESSAGE: &str = "UI command queue is full; please retry";
const WORKER_GONE_MESSAGE: &str =
    "Backend worker disconnected (possible startup/runtime failure); restart the app";

fn try_queue(cmd_tx: &Sender<BackendCommand>, cmd: BackendCommand) -> Result<(), (BackendCommand, UiError)> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(cmd)) => {
            tracing::warn!(command = cmd_name, "ui->backend queue full");
            Err((cmd, UiError::new(UiErrorContext::QueueFull, QUEUE_FULL_MESSAGE)))
        }
        Err(TrySendError::Disconnected(cmd)) => {
            tracing::error!(command = cmd_name, "backend worker disconnected");
            Err((
                cmd,
                UiError::new(UiErrorContext::WorkerDisconnected, WORKER_GONE_MESSAGE),
            ))
        }
    }
}

/// Queues `commands` for the worker. A command that cannot be queued is settled
/// locally as a failure so its busy flag drops; the last such error is returned.
pub fn dispatch_commands(
    cmd_tx: &Sender<BackendCommand>,
    state: &mut ViewState,
    commands: impl IntoIterator<Item = Command>,
) -> Option<UiError> {
    let mut queue: VecDeque<Command> = commands.into_iter().collect();
    let mut last_error = None;
    while let Some(command) = queue.pop_front() {
        if let Err((cmd, err)) = try_queue(cmd_tx, BackendCommand::Execute(command)) {
            if let BackendCommand::Execute(command) = cmd {
                let failure = ClientError::Network(err.message().to_string());
                queue.extend(state.apply(Outcome::failed(command, failure)));
            }
            last_error = Some(err);
        }
    }
    last_error
}

pub fn dispatch_upload_read(
    cmd_tx: &Sender<BackendCommand>,
    project_id: ProjectId,
    path: PathBuf,
) -> Option<UiError> {
    try_queue(cmd_tx, BackendCommand::ReadUpload { project_id, path })
        .err()
        .map(|(_, err)| err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::domain::User;

    fn signed_in() -> ViewState {
        let mut state = ViewState::new();
        state.session = Some(User {
            username: "alice".to_string(),
            email: None,
        });
        state
    }

    #[test]
    fn queued_commands_reach_the_worker_in_order() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let mut state = ViewState::new();
        let commands = state.start();

        assert!(dispatch_commands(&cmd_tx, &mut state, commands).is_none());
        let names: Vec<_> = cmd_rx.try_iter().map(|cmd| cmd.name()).collect();
        assert_eq!(names, vec!["check_backend", "check_session"]);
        assert!(state.checking_session);
    }

    #[test]
    fn full_queue_settles_the_command_as_failed() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut state = signed_in();
        cmd_tx
            .try_send(BackendCommand::Execute(Command::CheckBackend))
            .expect("fill queue");

        let command = state.refresh_projects().expect("load projects");
        let err = dispatch_commands(&cmd_tx, &mut state, Some(command)).expect("queue full");

        assert_eq!(err.context(), UiErrorContext::QueueFull);
        assert!(!err.is_fatal());
        assert!(!state.projects.loading);
        assert_eq!(state.projects.error.as_deref(), Some("Could not load projects."));
    }

    #[test]
    fn upload_read_remembers_the_project_it_was_picked_in() {
        let (cmd_tx, cmd_rx) = bounded(4);

        assert!(dispatch_upload_read(&cmd_tx, ProjectId(3), PathBuf::from("scan.pdf")).is_none());
        match cmd_rx.try_recv().expect("queued read") {
            BackendCommand::ReadUpload { project_id, path } => {
                assert_eq!(project_id, ProjectId(3));
                assert_eq!(path, PathBuf::from("scan.pdf"));
            }
            other => panic!("unexpected command {}", other.name()),
        }
    }

    #[test]
    fn dropped_worker_is_fatal() {
        let (cmd_tx, cmd_rx) = bounded(4);
        drop(cmd_rx);
        let mut state = ViewState::new();
        let command = state.load_fraud_model().expect("model command");

        let err = dispatch_commands(&cmd_tx, &mut state, Some(command)).expect("disconnected");
        assert!(err.is_fatal());
        assert!(!state.fraud.loading_model);

        let err = dispatch_upload_read(&cmd_tx, ProjectId(3), PathBuf::from("claims.csv"))
            .expect("disconnected");
        assert_eq!(err.context(), UiErrorContext::WorkerDisconnected);
    }
}
