use std::time::Duration;

use client_core::{Command, Tab, ViewState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::{dispatch_commands, dispatch_upload_read};
use crate::ui::panels::{self, PanelAction};

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub base_url: String,
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: ViewState,
    base_url: String,
    status: String,
    status_banner: Option<UiError>,
    /// A picked file is being read by the worker; the upload command is not issued yet.
    reading_upload: bool,
}

impl DesktopGuiApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            state: ViewState::new(),
            base_url: startup.base_url,
            status: "Starting backend worker...".to_string(),
            status_banner: None,
            reading_upload: false,
        };
        let commands = app.state.start();
        app.dispatch(commands);
        app
    }

    fn dispatch(&mut self, commands: impl IntoIterator<Item = Command>) {
        if let Some(err) = dispatch_commands(&self.cmd_tx, &mut self.state, commands) {
            self.status_banner = Some(err);
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Outcome(outcome) => {
                    let follow_ups = self.state.apply(outcome);
                    self.dispatch(follow_ups);
                }
                UiEvent::UploadReady { project_id, upload } => {
                    self.reading_upload = false;
                    if self.state.projects.selected_id() != Some(project_id) {
                        self.status = format!(
                            "Discarded {}: project #{project_id} is no longer open",
                            upload.filename
                        );
                    }
                    let command = self.state.upload_document(project_id, upload);
                    self.dispatch(command);
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.reading_upload = false;
                    self.status_banner = Some(err);
                }
            }
        }
    }

    fn pick_upload(&mut self) {
        let Some(project_id) = self.state.projects.selected_id() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new().pick_file() else {
            return;
        };
        match dispatch_upload_read(&self.cmd_tx, project_id, path) {
            Some(err) => self.status_banner = Some(err),
            None => self.reading_upload = true,
        }
    }

    fn handle_action(&mut self, action: Option<PanelAction>) {
        match action {
            Some(PanelAction::Run(command)) => self.dispatch(Some(command)),
            Some(PanelAction::PickUpload) => self.pick_upload(),
            None => {}
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("E2ERA");
                ui.separator();
                ui.label(self.state.backend.message());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match &self.state.session {
                        Some(user) => ui.label(format!("Signed in as {}", user.username)),
                        None => ui.label(egui::RichText::new("Not signed in").weak()),
                    };
                });
            });

            let mut picked = self.state.tab;
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut picked, tab, tab.label());
                }
            });
            if picked != self.state.tab {
                let command = self.state.select_tab(picked);
                self.dispatch(command);
            }
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            if let Some(banner) = self.status_banner.clone() {
                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(egui::Color32::from_rgb(220, 96, 96), banner.message());
                    if !banner.is_fatal() && ui.button("Dismiss").clicked() {
                        self.status_banner = None;
                    }
                });
            }
            ui.label(egui::RichText::new(&self.status).small().weak());
        });
    }

    fn show_tab(&mut self, ctx: &egui::Context) {
        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    action = match self.state.tab {
                        Tab::Overview => {
                            panels::overview(ui, &self.state);
                            None
                        }
                        Tab::Account => panels::account(ui, &mut self.state),
                        Tab::Projects => panels::projects(
                            ui,
                            &mut self.state,
                            &self.base_url,
                            self.reading_upload,
                        ),
                        Tab::Fraud => panels::fraud(ui, &mut self.state),
                    };
                });
        });
        self.handle_action(action);
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_top_bar(ctx);
        self.show_status_bar(ctx);
        self.show_tab(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
