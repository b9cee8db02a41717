use super::*;
use shared::{
    domain::{AgentResult, FraudLabel, FraudPrediction, ProjectId},
    error::ApiError,
    protocol::{DocumentUpload, PredictResponse},
};

use crate::error::ClientError;

fn project(id: i64, title: &str) -> Project {
    Project {
        id: ProjectId(id),
        title: title.to_string(),
        description: String::new(),
        created_at: None,
        documents: Vec::new(),
        notes: Vec::new(),
    }
}

fn signed_in_with(projects: Vec<Project>) -> ViewState {
    let mut state = ViewState::new();
    state.session = Some(User {
        username: "alice".to_string(),
        email: None,
    });
    state.projects.projects = projects;
    state.projects.loaded = true;
    state
}

#[test]
fn tab_ids_round_trip() {
    for tab in Tab::ALL {
        assert_eq!(Tab::from_id(tab.id()), Some(tab));
    }
    assert_eq!(Tab::from_id("settings"), None);
}

#[test]
fn busy_login_does_not_issue_a_second_request() {
    let mut state = ViewState::new();
    state.auth.username = "alice".to_string();
    assert!(state.submit_login().is_some());
    assert!(state.auth.busy);
    assert!(state.submit_login().is_none());
    assert!(state.submit_register().is_none());
}

#[test]
fn register_mode_routes_auth_submit_to_register() {
    let mut state = ViewState::new();
    state.auth.mode = AuthMode::Register;
    state.auth.username = " bob ".to_string();
    state.auth.password = "pw".to_string();
    state.auth.email = "bob@example.com".to_string();

    assert_eq!(
        state.submit_auth(),
        Some(Command::Register {
            username: "bob".to_string(),
            password: "pw".to_string(),
            email: "bob@example.com".to_string(),
        })
    );
}

#[test]
fn failed_registration_uses_registration_fallback() {
    let mut state = ViewState::new();
    state.auth.mode = AuthMode::Register;
    let _ = state.submit_auth();
    let follow_ups = state.apply(Outcome::Registered(Err(ClientError::Network(
        "dns error".to_string(),
    ))));

    assert!(follow_ups.is_empty());
    assert!(!state.auth.busy);
    assert_eq!(state.auth.error.as_deref(), Some("Registration failed."));
}

#[test]
fn session_check_success_requests_project_list() {
    let mut state = ViewState::new();
    let _ = state.start();
    let follow_ups = state.apply(Outcome::SessionChecked {
        generation: SessionGeneration::default(),
        result: Ok(User {
            username: "alice".to_string(),
            email: None,
        }),
    });

    assert_eq!(
        follow_ups,
        vec![Command::LoadProjects {
            generation: state.session_generation(),
        }]
    );
    assert!(state.projects.loading);
    assert!(!state.checking_session);
}

#[test]
fn project_list_requires_a_session() {
    let mut state = ViewState::new();
    assert!(state.refresh_projects().is_none());
    assert!(state.select_tab(Tab::Projects).is_none());
    assert_eq!(state.tab, Tab::Projects);
}

#[test]
fn failed_create_leaves_list_and_title_untouched() {
    let mut state = signed_in_with(vec![project(1, "Existing")]);
    state.projects.new_title = "Duplicate".to_string();
    let command = state.submit_project().expect("create command");
    state.apply(Outcome::failed(command, ApiError::new(400, "title required").into()));

    assert_eq!(state.projects.projects.len(), 1);
    assert_eq!(state.projects.new_title, "Duplicate");
    assert_eq!(state.projects.error.as_deref(), Some("title required"));
    assert!(!state.projects.creating);
}

#[test]
fn non_json_upload_failure_shows_unexpected_response() {
    let mut state = signed_in_with(vec![project(1, "One")]);
    let _ = state.open_project(ProjectId(1));
    let _ = state.upload_document(ProjectId(1), shared::protocol::DocumentUpload {
        filename: "scan.pdf".to_string(),
        mime_type: None,
        bytes: Vec::new(),
    });
    state.apply(Outcome::DocumentUploaded {
        project_id: ProjectId(1),
        result: Err(ClientError::UnexpectedResponse { status: 500 }),
    });

    assert_eq!(
        state.projects.detail_error.as_deref(),
        Some(UNEXPECTED_RESPONSE_MESSAGE)
    );
    assert!(state.projects.selected.as_ref().expect("detail").documents.is_empty());
}

#[test]
fn agent_data_for_a_closed_project_is_ignored() {
    let mut state = signed_in_with(vec![project(1, "One"), project(2, "Two")]);
    assert_eq!(
        state.open_project(ProjectId(1)),
        Some(Command::LoadAgentData {
            project_id: ProjectId(1)
        })
    );
    state.close_project();
    let _ = state.open_project(ProjectId(2));

    state.apply(Outcome::AgentDataLoaded {
        project_id: ProjectId(1),
        result: Ok(AgentResult {
            answer: Some("stale".to_string()),
            ..AgentResult::default()
        }),
    });
    assert!(state.projects.agent.result.is_none());
    assert!(state.projects.agent.loading);

    state.apply(Outcome::AgentDataLoaded {
        project_id: ProjectId(2),
        result: Ok(AgentResult {
            answer: Some("fresh".to_string()),
            ..AgentResult::default()
        }),
    });
    assert_eq!(
        state
            .projects
            .agent
            .result
            .as_ref()
            .and_then(|r| r.answer.as_deref()),
        Some("fresh")
    );
    assert!(!state.projects.agent.loading);
}

#[test]
fn upload_for_a_closed_project_still_updates_the_list_entry() {
    let mut state = signed_in_with(vec![project(1, "One"), project(2, "Two")]);
    let _ = state.open_project(ProjectId(1));
    let _ = state.upload_document(ProjectId(1), shared::protocol::DocumentUpload {
        filename: "a.txt".to_string(),
        mime_type: None,
        bytes: b"a".to_vec(),
    });
    state.close_project();
    let _ = state.open_project(ProjectId(2));

    state.apply(Outcome::DocumentUploaded {
        project_id: ProjectId(1),
        result: Ok(shared::domain::Document {
            id: shared::domain::DocumentId(10),
            name: "a.txt".to_string(),
            url: "/media/a.txt".to_string(),
            uploaded_at: None,
        }),
    });

    assert_eq!(state.projects.project(ProjectId(1)).expect("one").documents.len(), 1);
    assert!(state.projects.selected.as_ref().expect("two").documents.is_empty());
}

#[test]
fn agent_actions_need_an_open_project() {
    let mut state = signed_in_with(vec![project(1, "One")]);
    assert!(state.run_agent().is_none());
    assert!(state.refresh_agent().is_none());
    assert!(state.submit_note().is_none());
    assert!(state.open_project(ProjectId(42)).is_none());
}

#[test]
fn empty_prediction_list_is_an_unexpected_response() {
    let mut state = ViewState::new();
    let _ = state.submit_fraud();
    state.apply(Outcome::FraudScored(Ok(PredictResponse {
        predictions: Vec::new(),
        threshold: 0.5,
        feature_hint: Vec::new(),
    })));

    assert!(state.fraud.result.is_none());
    assert_eq!(state.fraud.error.as_deref(), Some(UNEXPECTED_RESPONSE_MESSAGE));
    assert!(!state.fraud.submitting);
}

#[test]
fn legit_prediction_renders_legit_decision() {
    let mut state = ViewState::new();
    let _ = state.submit_fraud();
    state.apply(Outcome::FraudScored(Ok(PredictResponse {
        predictions: vec![FraudPrediction {
            fraud_probability: 0.125,
            label: FraudLabel::Legit,
        }],
        threshold: 0.5,
        feature_hint: vec!["claim_amount".to_string()],
    })));

    assert_eq!(state.fraud.feature_hint, vec!["claim_amount".to_string()]);
    let result = state.fraud.result.expect("result");
    assert_eq!(result.probability_text(), "12.5%");
    assert_eq!(result.decision_text(), "LEGIT");
}

#[test]
fn resubmitting_fraud_clears_the_previous_result() {
    let mut state = ViewState::new();
    let _ = state.submit_fraud();
    state.apply(Outcome::FraudScored(Ok(PredictResponse {
        predictions: vec![FraudPrediction {
            fraud_probability: 0.9,
            label: FraudLabel::Fraud,
        }],
        threshold: 0.5,
        feature_hint: Vec::new(),
    })));
    assert!(state.fraud.result.is_some());

    assert!(state.submit_fraud().is_some());
    assert!(state.fraud.result.is_none());
    assert!(state.submit_fraud().is_none());
}

#[test]
fn undeliverable_command_releases_its_busy_flag() {
    let mut state = signed_in_with(vec![project(1, "One")]);
    let _ = state.open_project(ProjectId(1));
    state.projects.note_draft = "follow up with payer".to_string();
    let command = state.submit_note().expect("note command");
    assert!(state.projects.saving_note);

    state.apply(Outcome::failed(
        command,
        ClientError::Network("worker gone".to_string()),
    ));

    assert!(!state.projects.saving_note);
    assert_eq!(state.projects.note_draft, "follow up with payer");
    assert_eq!(
        state.projects.detail_error.as_deref(),
        Some("Could not save note.")
    );
}

fn upload(filename: &str) -> DocumentUpload {
    DocumentUpload {
        filename: filename.to_string(),
        mime_type: None,
        bytes: b"claim".to_vec(),
    }
}

fn user(username: &str) -> User {
    User {
        username: username.to_string(),
        email: None,
    }
}

#[test]
fn upload_read_for_a_project_no_longer_open_is_dropped() {
    let mut state = signed_in_with(vec![project(1, "One"), project(2, "Two")]);
    let _ = state.open_project(ProjectId(1));
    state.close_project();
    let _ = state.open_project(ProjectId(2));

    assert_eq!(state.upload_document(ProjectId(1), upload("a.pdf")), None);
    assert!(!state.projects.uploading);

    assert_eq!(
        state.upload_document(ProjectId(2), upload("b.pdf")),
        Some(Command::UploadDocument {
            project_id: ProjectId(2),
            upload: upload("b.pdf"),
        })
    );
}

#[test]
fn upload_after_closing_the_project_is_dropped() {
    let mut state = signed_in_with(vec![project(1, "One")]);
    let _ = state.open_project(ProjectId(1));
    state.close_project();

    assert_eq!(state.upload_document(ProjectId(1), upload("a.pdf")), None);
}

#[test]
fn late_session_check_does_not_undo_a_login() {
    let mut state = ViewState::new();
    let startup = state.start();
    let check = startup
        .into_iter()
        .find(|command| matches!(command, Command::CheckSession { .. }))
        .expect("session check");

    state.auth.username = "alice".to_string();
    let _ = state.submit_login();
    let follow_ups = state.apply(Outcome::LoggedIn(Ok(user("alice"))));
    assert_eq!(follow_ups.len(), 1);

    let follow_ups = state.apply(Outcome::failed(
        check,
        ClientError::UnexpectedResponse { status: 401 },
    ));

    assert!(follow_ups.is_empty());
    assert!(!state.checking_session);
    assert_eq!(state.session.as_ref().map(|u| u.username.as_str()), Some("alice"));
    assert!(state.projects.loading);
}

#[test]
fn late_session_check_success_does_not_replace_a_newer_login() {
    let mut state = ViewState::new();
    let generation = state.session_generation();
    let _ = state.start();
    let _ = state.apply(Outcome::LoggedIn(Ok(user("bob"))));

    let follow_ups = state.apply(Outcome::SessionChecked {
        generation,
        result: Ok(user("alice")),
    });

    assert!(follow_ups.is_empty());
    assert_eq!(state.session.as_ref().map(|u| u.username.as_str()), Some("bob"));
}

#[test]
fn project_created_by_a_previous_session_is_not_shown_to_the_next() {
    let mut state = ViewState::new();
    let _ = state.apply(Outcome::LoggedIn(Ok(user("alice"))));
    state.projects.new_title = "A-secret".to_string();
    let create = state.submit_project().expect("create command");

    let _ = state.logout();
    let _ = state.apply(Outcome::LoggedOut(Ok(())));
    let follow_ups = state.apply(Outcome::LoggedIn(Ok(user("bob"))));
    let Some(Command::LoadProjects { generation }) = follow_ups.first().cloned() else {
        panic!("expected a project list request, got {follow_ups:?}");
    };
    state.apply(Outcome::ProjectsLoaded {
        generation,
        result: Ok(vec![project(2, "B-own")]),
    });

    let Command::CreateProject {
        generation: stale, ..
    } = create
    else {
        panic!("expected a create request");
    };
    state.apply(Outcome::ProjectCreated {
        generation: stale,
        result: Ok(project(1, "A-secret")),
    });

    let titles: Vec<_> = state.projects.projects.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["B-own"]);
    assert!(!state.projects.creating);
}

#[test]
fn project_list_from_a_previous_session_is_ignored() {
    let mut state = ViewState::new();
    let follow_ups = state.apply(Outcome::LoggedIn(Ok(user("alice"))));
    let Some(Command::LoadProjects { generation: alice }) = follow_ups.first().cloned() else {
        panic!("expected a project list request");
    };
    let _ = state.apply(Outcome::LoggedOut(Ok(())));
    let _ = state.apply(Outcome::LoggedIn(Ok(user("bob"))));
    assert!(state.projects.loading);

    state.apply(Outcome::ProjectsLoaded {
        generation: alice,
        result: Ok(vec![project(1, "A-secret")]),
    });

    assert!(state.projects.projects.is_empty());
    assert!(state.projects.loading);
    assert!(!state.projects.loaded);
}
