use serde::{Deserialize, Serialize};

use crate::{
    claim::Claim,
    domain::{Document, FraudPrediction, Note, Project, User},
};

pub mod paths {
    use crate::domain::ProjectId;

    pub const HEALTH: &str = "/api/health/";
    pub const HELLO: &str = "/api/hello/";
    pub const AUTH_ME: &str = "/api/auth/me/";
    pub const AUTH_LOGIN: &str = "/api/auth/login/";
    pub const AUTH_REGISTER: &str = "/api/auth/register/";
    pub const AUTH_LOGOUT: &str = "/api/auth/logout/";
    pub const PROJECTS: &str = "/api/projects/";
    pub const FRAUD_MODEL: &str = "/api/fraud/model/";
    pub const FRAUD_PREDICT: &str = "/api/fraud/predict/";

    pub fn project(project_id: ProjectId) -> String {
        format!("/api/projects/{}/", project_id.0)
    }

    pub fn project_upload(project_id: ProjectId) -> String {
        format!("/api/projects/{}/upload/", project_id.0)
    }

    pub fn project_notes(project_id: ProjectId) -> String {
        format!("/api/projects/{}/notes/", project_id.0)
    }

    pub fn agent_data(project_id: ProjectId) -> String {
        format!("/api/projects/{}/agent/data/", project_id.0)
    }

    pub fn agent_run(project_id: ProjectId) -> String {
        format!("/api/projects/{}/agent/run/", project_id.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub app: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub authenticated: Option<bool>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectForm {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteForm {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub project: Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub document: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub note: Note,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest<'a> {
    pub claims: &'a [Claim],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<FraudPrediction>,
    pub threshold: f64,
    #[serde(default)]
    pub feature_hint: Vec<String>,
}

/// File handed to the upload endpoint as the `file` multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

