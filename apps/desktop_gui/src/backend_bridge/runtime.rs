//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{execute, read_upload, HttpBackend};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Spawns the worker thread. Each command runs as its own task so a slow agent run
/// does not hold up unrelated requests.
pub fn launch(base_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                return;
            }
        };

        let backend = match HttpBackend::new(base_url) {
            Ok(backend) => Arc::new(backend),
            Err(err) => {
                tracing::error!("failed to build backend http client: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err}"),
                )));
                return;
            }
        };
        tracing::info!(base_url = backend.base_url(), "backend worker ready");
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Talking to {}",
            backend.base_url()
        )));

        while let Ok(cmd) = cmd_rx.recv() {
            let backend = Arc::clone(&backend);
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                let event = handle_command(&backend, cmd).await;
                if ui_tx.send(event).is_err() {
                    tracing::debug!("ui event channel closed; dropping backend event");
                }
            });
        }
        tracing::info!("ui command channel closed; backend worker exiting");
    });
}

async fn handle_command(backend: &HttpBackend, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::Execute(command) => UiEvent::Outcome(execute(backend, command).await),
        BackendCommand::ReadUpload { project_id, path } => match read_upload(&path).await {
            Ok(upload) => UiEvent::UploadReady { project_id, upload },
            Err(err) => {
                tracing::warn!(path = %path.display(), "could not read upload: {err:#}");
                UiEvent::Error(UiError::new(
                    UiErrorContext::Upload,
                    format!("Could not read {}: {err:#}", path.display()),
                ))
            }
        },
    }
}
