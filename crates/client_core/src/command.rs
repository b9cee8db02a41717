//! Requests the view state asks for and the backend results that come back for it.

use shared::{
    claim::Claim,
    domain::{AgentResult, Document, FraudModelInfo, Note, Project, ProjectId, User},
    protocol::{DocumentUpload, PredictResponse},
};

use crate::{
    error::{ClientError, ClientResult},
    transport::Backend,
};

/// Counts session changes. Session-scoped requests carry the generation they were
/// issued under and their results are dropped once it has moved on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionGeneration(pub u64);

impl SessionGeneration {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CheckBackend,
    CheckSession {
        generation: SessionGeneration,
    },
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        email: String,
    },
    Logout,
    LoadProjects {
        generation: SessionGeneration,
    },
    CreateProject {
        generation: SessionGeneration,
        title: String,
        description: String,
    },
    RefreshProject {
        project_id: ProjectId,
    },
    UploadDocument {
        project_id: ProjectId,
        upload: DocumentUpload,
    },
    SaveNote {
        project_id: ProjectId,
        content: String,
    },
    LoadAgentData {
        project_id: ProjectId,
    },
    RunAgent {
        project_id: ProjectId,
    },
    LoadFraudModel,
    SubmitFraud {
        claim: Claim,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckBackend => "check_backend",
            Self::CheckSession { .. } => "check_session",
            Self::Login { .. } => "login",
            Self::Register { .. } => "register",
            Self::Logout => "logout",
            Self::LoadProjects { .. } => "load_projects",
            Self::CreateProject { .. } => "create_project",
            Self::RefreshProject { .. } => "refresh_project",
            Self::UploadDocument { .. } => "upload_document",
            Self::SaveNote { .. } => "save_note",
            Self::LoadAgentData { .. } => "load_agent_data",
            Self::RunAgent { .. } => "run_agent",
            Self::LoadFraudModel => "load_fraud_model",
            Self::SubmitFraud { .. } => "submit_fraud",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    BackendChecked(ClientResult<String>),
    SessionChecked {
        generation: SessionGeneration,
        result: ClientResult<User>,
    },
    LoggedIn(ClientResult<User>),
    Registered(ClientResult<User>),
    LoggedOut(ClientResult<()>),
    ProjectsLoaded {
        generation: SessionGeneration,
        result: ClientResult<Vec<Project>>,
    },
    ProjectCreated {
        generation: SessionGeneration,
        result: ClientResult<Project>,
    },
    ProjectRefreshed {
        project_id: ProjectId,
        result: ClientResult<Project>,
    },
    DocumentUploaded {
        project_id: ProjectId,
        result: ClientResult<Document>,
    },
    NoteSaved {
        project_id: ProjectId,
        result: ClientResult<Note>,
    },
    AgentDataLoaded {
        project_id: ProjectId,
        result: ClientResult<AgentResult>,
    },
    AgentRunFinished {
        project_id: ProjectId,
        result: ClientResult<AgentResult>,
    },
    FraudModelLoaded(ClientResult<FraudModelInfo>),
    FraudScored(ClientResult<PredictResponse>),
}

impl Outcome {
    /// The outcome `command` settles with when it could not be performed at all.
    pub fn failed(command: Command, err: ClientError) -> Self {
        match command {
            Command::CheckBackend => Self::BackendChecked(Err(err)),
            Command::CheckSession { generation } => Self::SessionChecked {
                generation,
                result: Err(err),
            },
            Command::Login { .. } => Self::LoggedIn(Err(err)),
            Command::Register { .. } => Self::Registered(Err(err)),
            Command::Logout => Self::LoggedOut(Err(err)),
            Command::LoadProjects { generation } => Self::ProjectsLoaded {
                generation,
                result: Err(err),
            },
            Command::CreateProject { generation, .. } => Self::ProjectCreated {
                generation,
                result: Err(err),
            },
            Command::RefreshProject { project_id } => Self::ProjectRefreshed {
                project_id,
                result: Err(err),
            },
            Command::UploadDocument { project_id, .. } => Self::DocumentUploaded {
                project_id,
                result: Err(err),
            },
            Command::SaveNote { project_id, .. } => Self::NoteSaved {
                project_id,
                result: Err(err),
            },
            Command::LoadAgentData { project_id } => Self::AgentDataLoaded {
                project_id,
                result: Err(err),
            },
            Command::RunAgent { project_id } => Self::AgentRunFinished {
                project_id,
                result: Err(err),
            },
            Command::LoadFraudModel => Self::FraudModelLoaded(Err(err)),
            Command::SubmitFraud { .. } => Self::FraudScored(Err(err)),
        }
    }
}

/// Performs one command against the backend. Never retries.
pub async fn execute<B: Backend + ?Sized>(backend: &B, command: Command) -> Outcome {
    tracing::debug!(command = command.name(), "executing command");
    match command {
        Command::CheckBackend => Outcome::BackendChecked(backend.hello().await),
        Command::CheckSession { generation } => Outcome::SessionChecked {
            generation,
            result: backend.current_user().await,
        },
        Command::Login { username, password } => {
            Outcome::LoggedIn(backend.login(&username, &password).await)
        }
        Command::Register {
            username,
            password,
            email,
        } => Outcome::Registered(backend.register(&username, &password, &email).await),
        Command::Logout => Outcome::LoggedOut(backend.logout().await),
        Command::LoadProjects { generation } => Outcome::ProjectsLoaded {
            generation,
            result: backend.list_projects().await,
        },
        Command::CreateProject {
            generation,
            title,
            description,
        } => Outcome::ProjectCreated {
            generation,
            result: backend.create_project(&title, &description).await,
        },
        Command::RefreshProject { project_id } => Outcome::ProjectRefreshed {
            project_id,
            result: backend.get_project(project_id).await,
        },
        Command::UploadDocument { project_id, upload } => Outcome::DocumentUploaded {
            project_id,
            result: backend.upload_document(project_id, upload).await,
        },
        Command::SaveNote {
            project_id,
            content,
        } => Outcome::NoteSaved {
            project_id,
            result: backend.add_note(project_id, &content).await,
        },
        Command::LoadAgentData { project_id } => Outcome::AgentDataLoaded {
            project_id,
            result: backend.agent_data(project_id).await,
        },
        Command::RunAgent { project_id } => Outcome::AgentRunFinished {
            project_id,
            result: backend.run_agent(project_id).await,
        },
        Command::LoadFraudModel => Outcome::FraudModelLoaded(backend.fraud_model().await),
        Command::SubmitFraud { claim } => {
            Outcome::FraudScored(backend.predict_fraud(std::slice::from_ref(&claim)).await)
        }
    }
}
