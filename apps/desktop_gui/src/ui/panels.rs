//! Tab bodies. Each panel edits the view state in place and reports at most one
//! action per frame for the app shell to dispatch.

use client_core::{AuthMode, Command, ProjectsView, ViewState};
use egui::{Color32, RichText};
use shared::{
    claim::ClaimField,
    domain::{AgentResult, FeatureKind, Project, ProjectId},
};

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 96, 96);
const FRAUD_COLOR: Color32 = Color32::from_rgb(214, 72, 72);
const LEGIT_COLOR: Color32 = Color32::from_rgb(84, 176, 108);

pub enum PanelAction {
    Run(Command),
    PickUpload,
}

impl From<Command> for PanelAction {
    fn from(command: Command) -> Self {
        Self::Run(command)
    }
}

fn error_label(ui: &mut egui::Ui, error: &Option<String>) {
    if let Some(error) = error {
        ui.colored_label(ERROR_COLOR, error.as_str());
    }
}

fn enter_pressed(ui: &egui::Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter))
}

pub fn overview(ui: &mut egui::Ui, state: &ViewState) {
    ui.heading("Overview");
    ui.label("Hello world from E2ERA.");
    ui.add_space(8.0);
    ui.label(
        "Collect claim documents and notes in projects, run the analysis agent over them, \
         and score individual claims for fraud.",
    );
    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label("Backend:");
        ui.label(RichText::new(state.backend.message()).strong());
    });
}

pub fn account(ui: &mut egui::Ui, state: &mut ViewState) -> Option<PanelAction> {
    ui.heading("Account");
    if let Some(user) = &state.session {
        ui.label(format!("Signed in as {}", user.username));
        if let Some(email) = &user.email {
            ui.label(RichText::new(email).weak());
        }
        ui.add_space(8.0);
        let sign_out = ui.add_enabled(!state.logging_out, egui::Button::new("Sign out"));
        if state.logging_out {
            ui.spinner();
        }
        if sign_out.clicked() {
            return state.logout().map(Into::into);
        }
        return None;
    }

    let checking = state.checking_session;
    if checking {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Checking session...");
        });
    }

    let auth = &mut state.auth;
    ui.horizontal(|ui| {
        ui.selectable_value(&mut auth.mode, AuthMode::Login, "Sign in");
        ui.selectable_value(&mut auth.mode, AuthMode::Register, "Create account");
    });
    ui.add_space(6.0);

    let mut submit = false;
    egui::Grid::new("auth_form").num_columns(2).show(ui, |ui| {
        ui.label("Username");
        ui.add(egui::TextEdit::singleline(&mut auth.username).desired_width(240.0));
        ui.end_row();

        ui.label("Password");
        let password = ui.add(
            egui::TextEdit::singleline(&mut auth.password)
                .password(true)
                .desired_width(240.0),
        );
        submit |= enter_pressed(ui, &password);
        ui.end_row();

        if auth.mode == AuthMode::Register {
            ui.label("Email");
            let email = ui.add(egui::TextEdit::singleline(&mut auth.email).desired_width(240.0));
            submit |= enter_pressed(ui, &email);
            ui.end_row();
        }
    });

    let label = match auth.mode {
        AuthMode::Login => "Sign in",
        AuthMode::Register => "Create account",
    };
    ui.horizontal(|ui| {
        submit |= ui
            .add_enabled(!auth.busy && !checking, egui::Button::new(label))
            .clicked();
        if auth.busy {
            ui.spinner();
        }
    });
    error_label(ui, &auth.error);

    if submit && !checking {
        state.submit_auth().map(Into::into)
    } else {
        None
    }
}

pub fn projects(
    ui: &mut egui::Ui,
    state: &mut ViewState,
    base_url: &str,
    reading_upload: bool,
) -> Option<PanelAction> {
    ui.heading("Projects");
    if !state.is_authenticated() {
        ui.label("Sign in on the Account tab to see your projects.");
        return None;
    }

    match state.projects.view() {
        ProjectsView::List => project_list(ui, state),
        ProjectsView::Detail(_) => project_detail(ui, state, base_url, reading_upload),
    }
}

fn project_list(ui: &mut egui::Ui, state: &mut ViewState) -> Option<PanelAction> {
    let mut create_clicked = false;
    let panel = &mut state.projects;

    ui.group(|ui| {
        ui.label(RichText::new("New project").strong());
        ui.add(egui::TextEdit::singleline(&mut panel.new_title).hint_text("Title"));
        ui.add(
            egui::TextEdit::multiline(&mut panel.new_description)
                .hint_text("Description (optional)")
                .desired_rows(2),
        );
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!panel.creating, egui::Button::new("Create"))
                .clicked()
            {
                create_clicked = true;
            }
            if panel.creating {
                ui.spinner();
            }
        });
    });
    if create_clicked {
        if let Some(command) = state.submit_project() {
            return Some(command.into());
        }
    }

    let panel = &state.projects;
    ui.add_space(8.0);
    let mut refresh = false;
    let mut opened: Option<ProjectId> = None;
    ui.horizontal(|ui| {
        refresh = ui
            .add_enabled(!panel.loading, egui::Button::new("Refresh"))
            .clicked();
        if panel.loading {
            ui.spinner();
        }
    });
    error_label(ui, &panel.error);

    if panel.loaded && panel.projects.is_empty() {
        ui.label(RichText::new("No projects yet.").weak());
    }
    for project in &panel.projects {
        ui.horizontal(|ui| {
            if ui.link(RichText::new(&project.title).strong()).clicked() {
                opened = Some(project.id);
            }
            ui.label(
                RichText::new(format!(
                    "{} documents, {} notes",
                    project.documents.len(),
                    project.notes.len()
                ))
                .weak(),
            );
        });
        if !project.description.is_empty() {
            ui.label(project.description.as_str());
        }
        ui.separator();
    }

    if refresh {
        return state.refresh_projects().map(Into::into);
    }
    opened
        .and_then(|project_id| state.open_project(project_id))
        .map(Into::into)
}

fn document_href(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), url.trim_start_matches('/'))
    }
}

fn project_detail(
    ui: &mut egui::Ui,
    state: &mut ViewState,
    base_url: &str,
    reading_upload: bool,
) -> Option<PanelAction> {
    let Some(project) = state.projects.selected.clone() else {
        return None;
    };
    let mut action: Option<PanelAction> = None;

    ui.horizontal(|ui| {
        if ui.button("< All projects").clicked() {
            state.close_project();
        }
        let refreshing = state.projects.refreshing;
        if ui
            .add_enabled(!refreshing, egui::Button::new("Refresh"))
            .clicked()
        {
            action = state.refresh_selected_project().map(Into::into);
        }
        if refreshing {
            ui.spinner();
        }
    });
    if state.projects.selected.is_none() {
        return None;
    }

    ui.heading(project.title.as_str());
    if !project.description.is_empty() {
        ui.label(project.description.as_str());
    }
    if let Some(created_at) = project.created_at {
        ui.label(RichText::new(format!("Created {}", created_at.format("%Y-%m-%d %H:%M"))).weak());
    }
    error_label(ui, &state.projects.detail_error);
    ui.separator();

    documents_section(ui, state, &project, base_url, reading_upload, &mut action);
    ui.separator();
    notes_section(ui, state, &project, &mut action);
    ui.separator();
    agent_section(ui, state, &mut action);

    action
}

fn documents_section(
    ui: &mut egui::Ui,
    state: &ViewState,
    project: &Project,
    base_url: &str,
    reading_upload: bool,
    action: &mut Option<PanelAction>,
) {
    ui.label(RichText::new(format!("Documents ({})", project.documents.len())).strong());
    let busy = state.projects.uploading || reading_upload;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!busy, egui::Button::new("Upload document..."))
            .clicked()
        {
            *action = Some(PanelAction::PickUpload);
        }
        if busy {
            ui.spinner();
        }
    });
    for document in &project.documents {
        ui.horizontal(|ui| {
            ui.hyperlink_to(document.name.as_str(), document_href(base_url, &document.url));
            if let Some(uploaded_at) = document.uploaded_at {
                ui.label(RichText::new(uploaded_at.format("%Y-%m-%d %H:%M").to_string()).weak());
            }
        });
    }
}

fn notes_section(
    ui: &mut egui::Ui,
    state: &mut ViewState,
    project: &Project,
    action: &mut Option<PanelAction>,
) {
    ui.label(RichText::new(format!("Notes ({})", project.notes.len())).strong());
    ui.add(
        egui::TextEdit::multiline(&mut state.projects.note_draft)
            .hint_text("Add a note")
            .desired_rows(3),
    );
    let saving = state.projects.saving_note;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!saving, egui::Button::new("Save note"))
            .clicked()
        {
            if let Some(command) = state.submit_note() {
                *action = Some(command.into());
            }
        }
        if saving {
            ui.spinner();
        }
    });
    for note in &project.notes {
        ui.label(RichText::new(note.created_at.format("%Y-%m-%d %H:%M").to_string()).weak());
        ui.label(note.content.as_str());
        ui.add_space(4.0);
    }
}

fn agent_section(ui: &mut egui::Ui, state: &mut ViewState, action: &mut Option<PanelAction>) {
    ui.label(RichText::new("Agent").strong());
    let (loading, running) = (state.projects.agent.loading, state.projects.agent.running);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!loading && !running, egui::Button::new("Refresh results"))
            .clicked()
        {
            *action = state.refresh_agent().map(Into::into);
        }
        if ui
            .add_enabled(!running, egui::Button::new("Run agent"))
            .clicked()
        {
            *action = state.run_agent().map(Into::into);
        }
        if loading || running {
            ui.spinner();
        }
    });

    let agent = &state.projects.agent;
    error_label(ui, &agent.error);
    match &agent.result {
        Some(result) if !result.is_empty() => agent_result(ui, result),
        _ if !loading && !running => {
            ui.label(RichText::new("No agent output yet.").weak());
        }
        _ => {}
    }
}

fn agent_result(ui: &mut egui::Ui, result: &AgentResult) {
    if let Some(answer) = &result.answer {
        ui.label(answer.as_str());
    } else if let Some(plan) = &result.plan {
        ui.collapsing("Plan", |ui| {
            ui.monospace(plan.to_string());
        });
    }
    if let Some(code) = &result.code {
        let title = match code.status() {
            Some(status) => format!("Code ({status:?})").to_lowercase(),
            None => "Code".to_string(),
        };
        ui.collapsing(title, |ui| {
            ui.code(code.source());
        });
    }
    if let Some(exec) = &result.exec {
        if !exec.stdout.trim().is_empty() {
            ui.collapsing("Output", |ui| {
                ui.monospace(exec.stdout.as_str());
            });
        }
        if exec.failed() {
            ui.colored_label(ERROR_COLOR, "Execution reported errors:");
            ui.monospace(exec.stderr.as_str());
        }
    }
}

pub fn fraud(ui: &mut egui::Ui, state: &mut ViewState) -> Option<PanelAction> {
    ui.heading("Fraud scoring");
    let mut action: Option<PanelAction> = None;
    let mut reload_model = false;
    let panel = &state.fraud;

    ui.horizontal(|ui| {
        if panel.loading_model {
            ui.spinner();
            ui.label("Loading model details...");
        } else if ui.small_button("Reload model details").clicked() {
            reload_model = true;
        }
    });
    error_label(ui, &panel.model_error);
    if let Some(model) = &panel.model {
        ui.collapsing("Model", |ui| {
            if let Some(artifact) = &model.artifact {
                ui.label(RichText::new(artifact).weak());
            }
            egui::Grid::new("fraud_metrics").num_columns(2).show(ui, |ui| {
                for (name, value) in &model.training_metrics {
                    ui.label(name.as_str());
                    ui.label(format!("{value:.3}"));
                    ui.end_row();
                }
            });
            for feature in &model.features {
                if !feature.reason.is_empty() {
                    ui.label(format!("{}: {}", feature.name, feature.reason));
                }
            }
        });
    }
    ui.add_space(8.0);
    egui::Grid::new("claim_form")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for field in ClaimField::ALL {
                ui.label(field.label());
                let hint = match field.kind() {
                    FeatureKind::Number => "number",
                    FeatureKind::Categorical => "text",
                };
                ui.add(
                    egui::TextEdit::singleline(state.fraud.form.value_mut(field))
                        .hint_text(hint)
                        .desired_width(200.0),
                );
                ui.end_row();
            }
        });

    let submitting = state.fraud.submitting;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!submitting, egui::Button::new("Score claim"))
            .clicked()
        {
            action = state.submit_fraud().map(Into::into);
        }
        if ui.button("Reset").clicked() {
            state.reset_fraud();
        }
        if submitting {
            ui.spinner();
        }
    });

    error_label(ui, &state.fraud.error);
    if let Some(result) = &state.fraud.result {
        let color = if result.is_fraud() {
            FRAUD_COLOR
        } else {
            LEGIT_COLOR
        };
        ui.horizontal(|ui| {
            ui.label("Fraud probability:");
            ui.label(RichText::new(result.probability_text()).strong().size(18.0));
            ui.label("Decision:");
            ui.label(RichText::new(result.decision_text()).strong().size(18.0).color(color));
        });
        ui.label(RichText::new(format!("Threshold {}", result.threshold)).weak());
        if !state.fraud.feature_hint.is_empty() {
            ui.label(
                RichText::new(format!(
                    "Features considered: {}",
                    state.fraud.feature_hint.join(", ")
                ))
                .weak(),
            );
        }
    }

    if reload_model {
        return state.load_fraud_model().map(Into::into);
    }
    action
}
