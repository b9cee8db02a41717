//! Plain-text rendering of the view state.

use client_core::{AuthMode, ProjectsView, Tab, ViewState};
use shared::{
    claim::ClaimField,
    domain::{AgentResult, Project},
};

pub fn render(state: &ViewState) -> String {
    let mut out = Vec::new();
    out.push(header(state));
    out.push(tab_bar(state.tab));
    out.push(String::new());
    match state.tab {
        Tab::Overview => overview(state, &mut out),
        Tab::Account => account(state, &mut out),
        Tab::Projects => projects(state, &mut out),
        Tab::Fraud => fraud(state, &mut out),
    }
    out.join("\n")
}

fn header(state: &ViewState) -> String {
    let session = match &state.session {
        Some(user) => format!("signed in as {}", user.username),
        None if state.checking_session => "checking session...".to_string(),
        None => "not signed in".to_string(),
    };
    format!("E2ERA | backend: {} | {session}", state.backend.message())
}

fn tab_bar(active: Tab) -> String {
    Tab::ALL
        .into_iter()
        .map(|tab| {
            if tab == active {
                format!("[{}]", tab.label())
            } else {
                format!(" {} ", tab.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_error(out: &mut Vec<String>, error: &Option<String>) {
    if let Some(error) = error {
        out.push(format!("! {error}"));
    }
}

fn overview(state: &ViewState, out: &mut Vec<String>) {
    out.push("Hello world from E2ERA.".to_string());
    out.push("Projects collect claim documents and notes for the agent; the fraud tab scores one claim.".to_string());
    out.push(String::new());
    out.push(format!("Backend says: {}", state.backend.message()));
}

fn account(state: &ViewState, out: &mut Vec<String>) {
    if let Some(user) = &state.session {
        out.push(format!("Username: {}", user.username));
        if let Some(email) = &user.email {
            out.push(format!("Email:    {email}"));
        }
        out.push(if state.logging_out {
            "Signing out...".to_string()
        } else {
            "Type `logout` to sign out.".to_string()
        });
        return;
    }

    let auth = &state.auth;
    match auth.mode {
        AuthMode::Login => out.push("Sign in with `login <username> <password>`.".to_string()),
        AuthMode::Register => out.push(
            "Create an account with `register <username> <password> <email>`.".to_string(),
        ),
    }
    if auth.busy {
        out.push("Working...".to_string());
    }
    push_error(out, &auth.error);
}

fn projects(state: &ViewState, out: &mut Vec<String>) {
    if state.session.is_none() {
        out.push("Sign in on the Account tab to see your projects.".to_string());
        return;
    }

    let panel = &state.projects;
    match panel.view() {
        ProjectsView::List => {
            if panel.loading {
                out.push("Loading projects...".to_string());
            } else if panel.projects.is_empty() {
                out.push("No projects yet. `create <title> [-d <description>]`".to_string());
            }
            for project in &panel.projects {
                out.push(format!(
                    "#{:<5} {}  ({} documents, {} notes)",
                    project.id.0,
                    project.title,
                    project.documents.len(),
                    project.notes.len()
                ));
            }
            if panel.creating {
                out.push("Creating project...".to_string());
            }
            push_error(out, &panel.error);
        }
        ProjectsView::Detail(_) => {
            if let Some(project) = &panel.selected {
                project_detail(state, project, out);
            }
        }
    }
}

fn project_detail(state: &ViewState, project: &Project, out: &mut Vec<String>) {
    let panel = &state.projects;
    out.push(format!("Project #{}: {}", project.id, project.title));
    if !project.description.is_empty() {
        out.push(project.description.clone());
    }
    if let Some(created_at) = project.created_at {
        out.push(format!("Created {}", created_at.format("%Y-%m-%d %H:%M")));
    }
    if panel.refreshing {
        out.push("Refreshing...".to_string());
    }
    push_error(out, &panel.detail_error);

    out.push(String::new());
    out.push(format!("Documents ({})", project.documents.len()));
    if panel.uploading {
        out.push("  uploading...".to_string());
    }
    for document in &project.documents {
        out.push(format!("  - {} <{}>", document.name, document.url));
    }

    out.push(String::new());
    out.push(format!("Notes ({})", project.notes.len()));
    if panel.saving_note {
        out.push("  saving...".to_string());
    }
    for note in &project.notes {
        out.push(format!(
            "  - [{}] {}",
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.content
        ));
    }

    out.push(String::new());
    out.push("Agent".to_string());
    let agent = &panel.agent;
    if agent.running {
        out.push("  running...".to_string());
    } else if agent.loading {
        out.push("  loading...".to_string());
    }
    push_error(out, &agent.error);
    match &agent.result {
        Some(result) if !result.is_empty() => agent_result(result, out),
        _ if !agent.loading && !agent.running => {
            out.push("  No agent output yet. `agent run` to start one.".to_string());
        }
        _ => {}
    }
}

fn agent_result(result: &AgentResult, out: &mut Vec<String>) {
    if let Some(answer) = &result.answer {
        out.push(format!("  Answer: {answer}"));
    } else if let Some(plan) = &result.plan {
        out.push(format!("  Plan: {plan}"));
    }
    if let Some(code) = &result.code {
        let status = code
            .status()
            .map(|status| format!(" ({status:?})").to_lowercase())
            .unwrap_or_default();
        out.push(format!("  Code{status}:"));
        out.extend(code.source().lines().map(|line| format!("    {line}")));
    }
    if let Some(exec) = &result.exec {
        if !exec.stdout.trim().is_empty() {
            out.push("  Output:".to_string());
            out.extend(exec.stdout.lines().map(|line| format!("    {line}")));
        }
        if exec.failed() {
            out.push("  Errors:".to_string());
            out.extend(exec.stderr.lines().map(|line| format!("    {line}")));
        }
    }
}

fn fraud(state: &ViewState, out: &mut Vec<String>) {
    let panel = &state.fraud;
    if panel.loading_model {
        out.push("Loading model details...".to_string());
    }
    push_error(out, &panel.model_error);
    if let Some(model) = &panel.model {
        let metrics = model
            .training_metrics
            .iter()
            .map(|(name, value)| format!("{name}={value:.3}"))
            .collect::<Vec<_>>()
            .join(", ");
        if !metrics.is_empty() {
            out.push(format!("Model metrics: {metrics}"));
        }
        for feature in &model.features {
            if !feature.reason.is_empty() {
                out.push(format!("  {}: {}", feature.name, feature.reason));
            }
        }
        out.push(String::new());
    }

    out.push("Claim (`fraud set <field> <value>`):".to_string());
    if panel.form.is_blank() {
        out.push("  (all fields blank; they are sent as null)".to_string());
    }
    for field in ClaimField::ALL {
        let value = panel.form.value(field);
        let shown = if value.trim().is_empty() { "-" } else { value };
        out.push(format!("  {:<22} {shown}", field.name()));
    }

    out.push(String::new());
    if panel.submitting {
        out.push("Scoring...".to_string());
    }
    push_error(out, &panel.error);
    if let Some(result) = &panel.result {
        out.push(format!(
            "Fraud probability: {}  Decision: {}  (threshold {})",
            result.probability_text(),
            result.decision_text(),
            result.threshold
        ));
        if !panel.feature_hint.is_empty() {
            out.push(format!("Features considered: {}", panel.feature_hint.join(", ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{
        AgentCode, CodeCell, CodeStatus, Document, DocumentId, FraudLabel, FraudResult, ProjectId,
        User,
    };

    fn signed_in() -> ViewState {
        let mut state = ViewState::new();
        state.session = Some(User {
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
        });
        state
    }

    #[test]
    fn header_shows_backend_and_session() {
        let mut state = ViewState::new();
        let _ = state.start();
        let text = render(&state);
        assert!(text.contains("Checking backend..."));
        assert!(text.contains("checking session..."));
        assert!(text.contains("[Overview]"));
    }

    #[test]
    fn projects_tab_asks_for_sign_in() {
        let mut state = ViewState::new();
        state.tab = Tab::Projects;
        assert!(render(&state).contains("Sign in on the Account tab"));
    }

    #[test]
    fn detail_lists_documents_newest_first() {
        let mut state = signed_in();
        state.tab = Tab::Projects;
        let mut project = Project {
            id: ProjectId(3),
            title: "Q3 audit".to_string(),
            description: String::new(),
            created_at: None,
            documents: Vec::new(),
            notes: Vec::new(),
        };
        for (id, name) in [(1, "older.pdf"), (2, "newer.pdf")] {
            project.prepend_document(Document {
                id: DocumentId(id),
                name: name.to_string(),
                url: format!("/media/{name}"),
                uploaded_at: None,
            });
        }
        state.projects.projects = vec![project];
        state.projects.loaded = true;
        let _ = state.open_project(ProjectId(3));

        let text = render(&state);
        assert!(text.contains("Project #3: Q3 audit"));
        let newer = text.find("newer.pdf").expect("newer listed");
        let older = text.find("older.pdf").expect("older listed");
        assert!(newer < older);
    }

    #[test]
    fn fraud_result_line() {
        let mut state = ViewState::new();
        state.tab = Tab::Fraud;
        state.fraud.form.set(ClaimField::ClaimAmount, "120");
        state.fraud.result = Some(FraudResult {
            probability: 0.83,
            label: FraudLabel::Fraud,
            threshold: 0.5,
        });

        let text = render(&state);
        assert!(text.contains("83.0%"));
        assert!(text.contains("Decision: FRAUD"));
        assert!(text.contains("claim_amount"));
        assert!(text.contains("120"));
        assert!(!text.contains("all fields blank"));
    }

    #[test]
    fn blank_claim_and_feature_hint_are_shown() {
        let mut state = ViewState::new();
        state.tab = Tab::Fraud;
        assert!(render(&state).contains("all fields blank"));

        state.fraud.result = Some(FraudResult {
            probability: 0.2,
            label: FraudLabel::Legit,
            threshold: 0.5,
        });
        state.fraud.feature_hint = vec!["claim_amount".to_string(), "paid_amount".to_string()];
        assert!(render(&state).contains("Features considered: claim_amount, paid_amount"));
    }

    #[test]
    fn stored_code_cell_shows_its_status() {
        let result = AgentResult {
            code: Some(AgentCode::Cell(CodeCell {
                id: shared::domain::CodeCellId(1),
                content: "print(1)".to_string(),
                status: CodeStatus::Done,
                stdout: String::new(),
                stderr: String::new(),
            })),
            ..AgentResult::default()
        };
        let mut out = Vec::new();
        agent_result(&result, &mut out);
        assert_eq!(out[0], "  Code (done):");
        assert_eq!(out[1], "    print(1)");
    }

    #[test]
    fn account_tab_shows_auth_error() {
        let mut state = ViewState::new();
        state.tab = Tab::Account;
        state.auth.error = Some("invalid credentials".to_string());
        assert!(render(&state).contains("! invalid credentials"));
    }
}
