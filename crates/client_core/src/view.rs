//! View state for the client and the reducer that folds backend outcomes into it.
//!
//! Methods that start a request validate the triggering form, raise the busy flag
//! guarding its control and hand back the [`Command`] to perform, or `None` when
//! nothing should be sent. [`ViewState::apply`] lowers the flag again and reconciles
//! the result; any follow-up commands it returns should be run the same way.

use shared::{
    claim::ClaimForm,
    domain::{AgentResult, FraudModelInfo, FraudResult, Project, ProjectId, User},
    protocol::DocumentUpload,
};
use tracing::{debug, info, warn};

use crate::{
    command::{Command, Outcome, SessionGeneration},
    error::{ClientResult, UNEXPECTED_RESPONSE_MESSAGE},
};

pub const CHECKING_BACKEND_MESSAGE: &str = "Checking backend...";
pub const BACKEND_UNREACHABLE_MESSAGE: &str = "Backend unreachable";

const LOGIN_FAILED: &str = "Login failed.";
const REGISTER_FAILED: &str = "Registration failed.";
const PROJECTS_FAILED: &str = "Could not load projects.";
const CREATE_PROJECT_FAILED: &str = "Could not create project.";
const REFRESH_PROJECT_FAILED: &str = "Could not refresh project.";
const UPLOAD_FAILED: &str = "Upload failed.";
const NOTE_FAILED: &str = "Could not save note.";
const AGENT_DATA_FAILED: &str = "Could not load agent results.";
const AGENT_RUN_FAILED: &str = "Agent run failed.";
const FRAUD_MODEL_FAILED: &str = "Could not load model details.";
const FRAUD_SCORE_FAILED: &str = "Scoring failed.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Overview,
    Account,
    Projects,
    Fraud,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Account, Tab::Projects, Tab::Fraud];

    pub fn id(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Account => "account",
            Self::Projects => "projects",
            Self::Fraud => "fraud",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Account => "Account",
            Self::Projects => "Projects",
            Self::Fraud => "Fraud scoring",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.id() == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendStatus {
    #[default]
    Checking,
    Online(String),
    Unreachable,
}

impl BackendStatus {
    pub fn message(&self) -> &str {
        match self {
            Self::Checking => CHECKING_BACKEND_MESSAGE,
            Self::Online(message) => message,
            Self::Unreachable => BACKEND_UNREACHABLE_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Default)]
pub struct AuthPanel {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
    pub email: String,
    pub busy: bool,
    pub error: Option<String>,
}

impl AuthPanel {
    fn clear_form(&mut self) {
        self.username.clear();
        self.password.clear();
        self.email.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgentPanel {
    pub result: Option<AgentResult>,
    pub loading: bool,
    pub running: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectsView {
    List,
    Detail(ProjectId),
}

#[derive(Debug, Clone, Default)]
pub struct ProjectsPanel {
    /// Newest first.
    pub projects: Vec<Project>,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub new_title: String,
    pub new_description: String,
    pub creating: bool,
    /// Detail view's own copy of the opened project.
    pub selected: Option<Project>,
    pub note_draft: String,
    pub uploading: bool,
    pub saving_note: bool,
    pub refreshing: bool,
    pub detail_error: Option<String>,
    pub agent: AgentPanel,
}

impl ProjectsPanel {
    pub fn view(&self) -> ProjectsView {
        match &self.selected {
            Some(project) => ProjectsView::Detail(project.id),
            None => ProjectsView::List,
        }
    }

    pub fn selected_id(&self) -> Option<ProjectId> {
        self.selected.as_ref().map(|project| project.id)
    }

    pub fn project(&self, project_id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    fn selected_matches(&self, project_id: ProjectId) -> bool {
        self.selected_id() == Some(project_id)
    }

    /// Applies `update` to the list entry and to the detail copy of the same project.
    fn update_project(&mut self, project_id: ProjectId, update: impl Fn(&mut Project)) {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) {
            update(project);
        }
        if let Some(selected) = self.selected.as_mut().filter(|p| p.id == project_id) {
            update(selected);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FraudPanel {
    pub form: ClaimForm,
    pub model: Option<FraudModelInfo>,
    pub loading_model: bool,
    pub model_error: Option<String>,
    pub submitting: bool,
    pub result: Option<FraudResult>,
    /// Feature names the backend reported with the last score.
    pub feature_hint: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub tab: Tab,
    pub backend: BackendStatus,
    pub session: Option<User>,
    pub checking_session: bool,
    pub logging_out: bool,
    pub auth: AuthPanel,
    pub projects: ProjectsPanel,
    pub fraud: FraudPanel,
    generation: SessionGeneration,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Greeting fetch and session check issued once when the client comes up.
    pub fn start(&mut self) -> Vec<Command> {
        self.backend = BackendStatus::Checking;
        self.checking_session = true;
        vec![
            Command::CheckBackend,
            Command::CheckSession {
                generation: self.generation,
            },
        ]
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_generation(&self) -> SessionGeneration {
        self.generation
    }

    fn is_stale(&self, generation: SessionGeneration, what: &str) -> bool {
        let stale = generation != self.generation;
        if stale {
            debug!(
                issued = generation.0,
                current = self.generation.0,
                "ignoring {what} from an earlier session"
            );
        }
        stale
    }

    pub fn select_tab(&mut self, tab: Tab) -> Option<Command> {
        self.tab = tab;
        match tab {
            Tab::Fraud if self.fraud.model.is_none() => self.load_fraud_model(),
            Tab::Projects if !self.projects.loaded => self.refresh_projects(),
            _ => None,
        }
    }

    pub fn submit_auth(&mut self) -> Option<Command> {
        match self.auth.mode {
            AuthMode::Login => self.submit_login(),
            AuthMode::Register => self.submit_register(),
        }
    }

    pub fn submit_login(&mut self) -> Option<Command> {
        if self.auth.busy {
            return None;
        }
        self.auth.busy = true;
        self.auth.error = None;
        Some(Command::Login {
            username: self.auth.username.trim().to_string(),
            password: self.auth.password.clone(),
        })
    }

    pub fn submit_register(&mut self) -> Option<Command> {
        if self.auth.busy {
            return None;
        }
        self.auth.busy = true;
        self.auth.error = None;
        Some(Command::Register {
            username: self.auth.username.trim().to_string(),
            password: self.auth.password.clone(),
            email: self.auth.email.trim().to_string(),
        })
    }

    pub fn logout(&mut self) -> Option<Command> {
        if self.logging_out {
            return None;
        }
        self.logging_out = true;
        Some(Command::Logout)
    }

    pub fn refresh_projects(&mut self) -> Option<Command> {
        if self.session.is_none() || self.projects.loading {
            return None;
        }
        self.projects.loading = true;
        self.projects.error = None;
        Some(Command::LoadProjects {
            generation: self.generation,
        })
    }

    pub fn submit_project(&mut self) -> Option<Command> {
        let title = self.projects.new_title.trim();
        if title.is_empty() || self.projects.creating {
            return None;
        }
        let command = Command::CreateProject {
            generation: self.generation,
            title: title.to_string(),
            description: self.projects.new_description.trim().to_string(),
        };
        self.projects.creating = true;
        self.projects.error = None;
        Some(command)
    }

    pub fn open_project(&mut self, project_id: ProjectId) -> Option<Command> {
        let project = self.projects.project(project_id)?.clone();
        let panel = &mut self.projects;
        panel.selected = Some(project);
        panel.note_draft.clear();
        panel.detail_error = None;
        panel.agent = AgentPanel {
            loading: true,
            ..AgentPanel::default()
        };
        Some(Command::LoadAgentData { project_id })
    }

    pub fn close_project(&mut self) {
        let panel = &mut self.projects;
        panel.selected = None;
        panel.note_draft.clear();
        panel.detail_error = None;
        panel.agent = AgentPanel::default();
    }

    pub fn refresh_selected_project(&mut self) -> Option<Command> {
        let project_id = self.projects.selected_id()?;
        if self.projects.refreshing {
            return None;
        }
        self.projects.refreshing = true;
        self.projects.detail_error = None;
        Some(Command::RefreshProject { project_id })
    }

    /// Uploads `upload` into `project_id`, which must still be the open project.
    pub fn upload_document(
        &mut self,
        project_id: ProjectId,
        upload: DocumentUpload,
    ) -> Option<Command> {
        if !self.projects.selected_matches(project_id) {
            debug!(
                %project_id,
                filename = %upload.filename,
                "dropping upload for project no longer open"
            );
            return None;
        }
        if self.projects.uploading {
            return None;
        }
        self.projects.uploading = true;
        self.projects.detail_error = None;
        Some(Command::UploadDocument { project_id, upload })
    }

    pub fn submit_note(&mut self) -> Option<Command> {
        let project_id = self.projects.selected_id()?;
        let content = self.projects.note_draft.trim();
        if content.is_empty() || self.projects.saving_note {
            return None;
        }
        let command = Command::SaveNote {
            project_id,
            content: content.to_string(),
        };
        self.projects.saving_note = true;
        self.projects.detail_error = None;
        Some(command)
    }

    pub fn refresh_agent(&mut self) -> Option<Command> {
        let project_id = self.projects.selected_id()?;
        let agent = &mut self.projects.agent;
        if agent.loading || agent.running {
            return None;
        }
        agent.loading = true;
        agent.error = None;
        Some(Command::LoadAgentData { project_id })
    }

    pub fn run_agent(&mut self) -> Option<Command> {
        let project_id = self.projects.selected_id()?;
        let agent = &mut self.projects.agent;
        if agent.running {
            return None;
        }
        agent.running = true;
        agent.error = None;
        Some(Command::RunAgent { project_id })
    }

    pub fn load_fraud_model(&mut self) -> Option<Command> {
        if self.fraud.loading_model {
            return None;
        }
        self.fraud.loading_model = true;
        self.fraud.model_error = None;
        Some(Command::LoadFraudModel)
    }

    pub fn submit_fraud(&mut self) -> Option<Command> {
        if self.fraud.submitting {
            return None;
        }
        self.fraud.submitting = true;
        self.fraud.error = None;
        self.fraud.result = None;
        self.fraud.feature_hint.clear();
        Some(Command::SubmitFraud {
            claim: self.fraud.form.normalize(),
        })
    }

    pub fn reset_fraud(&mut self) {
        self.fraud.form.clear();
        self.fraud.result = None;
        self.fraud.feature_hint.clear();
        self.fraud.error = None;
    }

    fn establish_session(&mut self, user: User) -> Option<Command> {
        info!(username = %user.username, "session established");
        self.generation = self.generation.next();
        self.session = Some(user);
        self.projects = ProjectsPanel::default();
        self.refresh_projects()
    }

    fn clear_session(&mut self) {
        if let Some(user) = self.session.take() {
            info!(username = %user.username, "session cleared");
        }
        self.generation = self.generation.next();
        self.projects = ProjectsPanel::default();
    }

    fn finish_auth(&mut self, result: ClientResult<User>, fallback: &str) -> Option<Command> {
        self.auth.busy = false;
        match result {
            Ok(user) => {
                self.auth.clear_form();
                self.auth.error = None;
                self.establish_session(user)
            }
            Err(err) => {
                self.auth.error = Some(err.user_message(fallback));
                None
            }
        }
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Command> {
        let mut follow_ups = Vec::new();

        match outcome {
            Outcome::BackendChecked(result) => {
                self.backend = match result {
                    Ok(message) => BackendStatus::Online(message),
                    Err(err) => {
                        warn!("backend greeting failed: {err}");
                        BackendStatus::Unreachable
                    }
                };
            }
            Outcome::SessionChecked { generation, result } => {
                self.checking_session = false;
                if self.is_stale(generation, "session check") {
                    return follow_ups;
                }
                match result {
                    Ok(user) => follow_ups.extend(self.establish_session(user)),
                    Err(err) if err.is_unauthorized() => {
                        debug!("no active session");
                        self.clear_session();
                    }
                    Err(err) => {
                        warn!("session check failed: {err}");
                        self.clear_session();
                    }
                }
            }
            Outcome::LoggedIn(result) => {
                follow_ups.extend(self.finish_auth(result, LOGIN_FAILED));
            }
            Outcome::Registered(result) => {
                follow_ups.extend(self.finish_auth(result, REGISTER_FAILED));
            }
            Outcome::LoggedOut(result) => {
                self.logging_out = false;
                if let Err(err) = result {
                    warn!("logout request failed, clearing local session anyway: {err}");
                }
                self.clear_session();
            }
            Outcome::ProjectsLoaded { generation, result } => {
                if self.is_stale(generation, "project list") {
                    return follow_ups;
                }
                let panel = &mut self.projects;
                panel.loading = false;
                match result {
                    Ok(projects) => {
                        if let Some(selected) = panel.selected.as_mut() {
                            if let Some(fresh) = projects.iter().find(|p| p.id == selected.id) {
                                *selected = fresh.clone();
                            }
                        }
                        panel.projects = projects;
                        panel.loaded = true;
                        panel.error = None;
                    }
                    Err(err) => panel.error = Some(err.user_message(PROJECTS_FAILED)),
                }
            }
            Outcome::ProjectCreated { generation, result } => {
                if self.is_stale(generation, "created project") {
                    return follow_ups;
                }
                let panel = &mut self.projects;
                panel.creating = false;
                match result {
                    Ok(project) => {
                        panel.projects.insert(0, project);
                        panel.new_title.clear();
                        panel.new_description.clear();
                        panel.error = None;
                    }
                    Err(err) => panel.error = Some(err.user_message(CREATE_PROJECT_FAILED)),
                }
            }
            Outcome::ProjectRefreshed { project_id, result } => {
                let panel = &mut self.projects;
                panel.refreshing = false;
                match result {
                    Ok(project) => panel.update_project(project_id, |p| *p = project.clone()),
                    Err(err) if panel.selected_matches(project_id) => {
                        panel.detail_error = Some(err.user_message(REFRESH_PROJECT_FAILED));
                    }
                    Err(err) => debug!(%project_id, "dropping refresh failure: {err}"),
                }
            }
            Outcome::DocumentUploaded { project_id, result } => {
                let panel = &mut self.projects;
                panel.uploading = false;
                match result {
                    Ok(document) => {
                        panel.update_project(project_id, |p| p.prepend_document(document.clone()));
                    }
                    Err(err) if panel.selected_matches(project_id) => {
                        panel.detail_error = Some(err.user_message(UPLOAD_FAILED));
                    }
                    Err(err) => debug!(%project_id, "dropping upload failure: {err}"),
                }
            }
            Outcome::NoteSaved { project_id, result } => {
                let panel = &mut self.projects;
                panel.saving_note = false;
                match result {
                    Ok(note) => {
                        panel.update_project(project_id, |p| p.prepend_note(note.clone()));
                        if panel.selected_matches(project_id) {
                            panel.note_draft.clear();
                        }
                    }
                    Err(err) if panel.selected_matches(project_id) => {
                        panel.detail_error = Some(err.user_message(NOTE_FAILED));
                    }
                    Err(err) => debug!(%project_id, "dropping note failure: {err}"),
                }
            }
            Outcome::AgentDataLoaded { project_id, result } => {
                if !self.projects.selected_matches(project_id) {
                    debug!(%project_id, "ignoring agent data for project no longer open");
                    return follow_ups;
                }
                let agent = &mut self.projects.agent;
                agent.loading = false;
                match result {
                    Ok(result) => {
                        agent.result = Some(result);
                        agent.error = None;
                    }
                    Err(err) => agent.error = Some(err.user_message(AGENT_DATA_FAILED)),
                }
            }
            Outcome::AgentRunFinished { project_id, result } => {
                if !self.projects.selected_matches(project_id) {
                    debug!(%project_id, "ignoring agent run for project no longer open");
                    return follow_ups;
                }
                let agent = &mut self.projects.agent;
                agent.running = false;
                match result {
                    Ok(result) => {
                        agent.result = Some(result);
                        agent.error = None;
                    }
                    Err(err) => agent.error = Some(err.user_message(AGENT_RUN_FAILED)),
                }
            }
            Outcome::FraudModelLoaded(result) => {
                self.fraud.loading_model = false;
                match result {
                    Ok(model) => {
                        self.fraud.model = Some(model);
                        self.fraud.model_error = None;
                    }
                    Err(err) => self.fraud.model_error = Some(err.user_message(FRAUD_MODEL_FAILED)),
                }
            }
            Outcome::FraudScored(result) => {
                self.fraud.submitting = false;
                match result {
                    Ok(response) => match response.predictions.first() {
                        Some(prediction) => {
                            self.fraud.result = Some(FraudResult {
                                probability: prediction.fraud_probability,
                                label: prediction.label,
                                threshold: response.threshold,
                            });
                            self.fraud.feature_hint = response.feature_hint;
                            self.fraud.error = None;
                        }
                        None => {
                            warn!("fraud scoring returned no predictions");
                            self.fraud.error = Some(UNEXPECTED_RESPONSE_MESSAGE.to_string());
                        }
                    },
                    Err(err) => self.fraud.error = Some(err.user_message(FRAUD_SCORE_FAILED)),
                }
            }
        }

        follow_ups
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
