//! HTTP boundary to the E2ERA backend.

use std::path::Path;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    claim::Claim,
    domain::{AgentResult, Document, FraudModelInfo, Note, Project, ProjectId, User},
    error::{ApiError, ErrorBody},
    protocol::{
        paths, CreateProjectForm, DocumentResponse, DocumentUpload, HealthResponse,
        HelloResponse, LoginForm, NoteForm, NoteResponse, PredictRequest, PredictResponse,
        ProjectResponse, ProjectsResponse, RegisterForm, SessionResponse,
    },
};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_HELLO_MESSAGE: &str = "Backend responded";

#[async_trait]
pub trait Backend: Send + Sync {
    async fn health(&self) -> ClientResult<HealthResponse>;
    async fn hello(&self) -> ClientResult<String>;
    async fn current_user(&self) -> ClientResult<User>;
    async fn login(&self, username: &str, password: &str) -> ClientResult<User>;
    async fn register(&self, username: &str, password: &str, email: &str) -> ClientResult<User>;
    async fn logout(&self) -> ClientResult<()>;
    async fn list_projects(&self) -> ClientResult<Vec<Project>>;
    async fn create_project(&self, title: &str, description: &str) -> ClientResult<Project>;
    async fn get_project(&self, project_id: ProjectId) -> ClientResult<Project>;
    async fn upload_document(
        &self,
        project_id: ProjectId,
        upload: DocumentUpload,
    ) -> ClientResult<Document>;
    async fn add_note(&self, project_id: ProjectId, content: &str) -> ClientResult<Note>;
    async fn agent_data(&self, project_id: ProjectId) -> ClientResult<AgentResult>;
    async fn run_agent(&self, project_id: ProjectId) -> ClientResult<AgentResult>;
    async fn fraud_model(&self) -> ClientResult<FraudModelInfo>;
    async fn predict_fraud(&self, claims: &[Claim]) -> ClientResult<PredictResponse>;
}

/// Backend reached over HTTP; the session cookie lives in the client's cookie store.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        debug!(method = "GET", path, "backend request");
        let response = self.http.get(self.url(path)).send().await?;
        read_json(path, response).await
    }

    async fn post_form<F, T>(&self, path: &str, form: &F) -> ClientResult<T>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = "POST", path, "backend request");
        let response = self.http.post(self.url(path)).form(form).send().await?;
        read_json(path, response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        debug!(method = "POST", path, "backend request");
        let response = self.http.post(self.url(path)).send().await?;
        read_json(path, response).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> ClientResult<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(error_from_body(path, status, &body));
    }

    serde_json::from_slice(&body).map_err(|err| {
        warn!(path, status = status.as_u16(), "undecodable backend response: {err}");
        ClientError::Decode(err.to_string())
    })
}

fn error_from_body(path: &str, status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(error_body) => {
            warn!(path, status = status.as_u16(), error = %error_body.error, "backend error");
            ApiError::from_body(status.as_u16(), error_body).into()
        }
        Err(_) => {
            warn!(path, status = status.as_u16(), "backend error without json body");
            ClientError::UnexpectedResponse {
                status: status.as_u16(),
            }
        }
    }
}

fn session_user(path: &str, response: SessionResponse) -> ClientResult<User> {
    if response.authenticated == Some(false) {
        return Err(ApiError::new(StatusCode::UNAUTHORIZED.as_u16(), "not authenticated").into());
    }
    response
        .user
        .ok_or_else(|| ClientError::Decode(format!("{path}: response carried no user")))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn health(&self) -> ClientResult<HealthResponse> {
        self.get_json(paths::HEALTH).await
    }

    async fn hello(&self) -> ClientResult<String> {
        let response: HelloResponse = self.get_json(paths::HELLO).await?;
        Ok(response
            .message
            .unwrap_or_else(|| DEFAULT_HELLO_MESSAGE.to_string()))
    }

    async fn current_user(&self) -> ClientResult<User> {
        let response: SessionResponse = self.get_json(paths::AUTH_ME).await?;
        session_user(paths::AUTH_ME, response)
    }

    async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: SessionResponse = self.post_form(paths::AUTH_LOGIN, &form).await?;
        session_user(paths::AUTH_LOGIN, response)
    }

    async fn register(&self, username: &str, password: &str, email: &str) -> ClientResult<User> {
        let form = RegisterForm {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        let response: SessionResponse = self.post_form(paths::AUTH_REGISTER, &form).await?;
        session_user(paths::AUTH_REGISTER, response)
    }

    async fn logout(&self) -> ClientResult<()> {
        debug!(method = "POST", path = paths::AUTH_LOGOUT, "backend request");
        let response = self.http.post(self.url(paths::AUTH_LOGOUT)).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await?;
        Err(error_from_body(paths::AUTH_LOGOUT, status, &body))
    }

    async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let response: ProjectsResponse = self.get_json(paths::PROJECTS).await?;
        Ok(response.projects)
    }

    async fn create_project(&self, title: &str, description: &str) -> ClientResult<Project> {
        let form = CreateProjectForm {
            title: title.to_string(),
            description: description.to_string(),
        };
        let response: ProjectResponse = self.post_form(paths::PROJECTS, &form).await?;
        Ok(response.project)
    }

    async fn get_project(&self, project_id: ProjectId) -> ClientResult<Project> {
        let response: ProjectResponse = self.get_json(&paths::project(project_id)).await?;
        Ok(response.project)
    }

    async fn upload_document(
        &self,
        project_id: ProjectId,
        upload: DocumentUpload,
    ) -> ClientResult<Document> {
        let path = paths::project_upload(project_id);
        let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.filename);
        if let Some(mime_type) = upload.mime_type.as_deref() {
            part = part
                .mime_str(mime_type)
                .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        }
        let form = multipart::Form::new().part("file", part);

        debug!(method = "POST", path = %path, "backend multipart request");
        let response = self.http.post(self.url(&path)).multipart(form).send().await?;
        let response: DocumentResponse = read_json(&path, response).await?;
        Ok(response.document)
    }

    async fn add_note(&self, project_id: ProjectId, content: &str) -> ClientResult<Note> {
        let form = NoteForm {
            content: content.to_string(),
        };
        let response: NoteResponse = self
            .post_form(&paths::project_notes(project_id), &form)
            .await?;
        Ok(response.note)
    }

    async fn agent_data(&self, project_id: ProjectId) -> ClientResult<AgentResult> {
        self.get_json(&paths::agent_data(project_id)).await
    }

    async fn run_agent(&self, project_id: ProjectId) -> ClientResult<AgentResult> {
        self.post_empty(&paths::agent_run(project_id)).await
    }

    async fn fraud_model(&self) -> ClientResult<FraudModelInfo> {
        self.get_json(paths::FRAUD_MODEL).await
    }

    async fn predict_fraud(&self, claims: &[Claim]) -> ClientResult<PredictResponse> {
        debug!(
            method = "POST",
            path = paths::FRAUD_PREDICT,
            claims = claims.len(),
            "backend request"
        );
        let response = self
            .http
            .post(self.url(paths::FRAUD_PREDICT))
            .json(&PredictRequest { claims })
            .send()
            .await?;
        read_json(paths::FRAUD_PREDICT, response).await
    }
}

/// Reads a local file into an upload, guessing its MIME type from the extension.
pub async fn read_upload(path: &Path) -> anyhow::Result<DocumentUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("'{}' has no file name", path.display()))?;
    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    Ok(DocumentUpload {
        filename,
        mime_type,
        bytes,
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
