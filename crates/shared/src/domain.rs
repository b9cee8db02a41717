use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProjectId);
id_newtype!(DocumentId);
id_newtype!(NoteId);
id_newtype!(CodeCellId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Newest first.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Newest first.
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Project {
    pub fn prepend_document(&mut self, document: Document) {
        self.documents.insert(0, document);
    }

    pub fn prepend_note(&mut self, note: Note) {
        self.notes.insert(0, note);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Generated,
    Done,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    pub id: CodeCellId,
    pub content: String,
    pub status: CodeStatus,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

/// Stored cells come back from `agent/data`, a fresh run returns bare source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentCode {
    Cell(CodeCell),
    Source(String),
}

impl AgentCode {
    pub fn source(&self) -> &str {
        match self {
            Self::Cell(cell) => &cell.content,
            Self::Source(source) => source,
        }
    }

    pub fn status(&self) -> Option<CodeStatus> {
        match self {
            Self::Cell(cell) => Some(cell.status),
            Self::Source(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl ExecOutput {
    pub fn failed(&self) -> bool {
        !self.stderr.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Older backends return a plan instead of an answer; its shape is not fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<AgentCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecOutput>,
}

impl AgentResult {
    pub fn is_empty(&self) -> bool {
        self.plan.is_none() && self.answer.is_none() && self.code.is_none() && self.exec.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Number,
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudFeature {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FeatureKind>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FraudModelInfo {
    pub features: Vec<FraudFeature>,
    #[serde(default)]
    pub model_columns: Vec<String>,
    #[serde(default)]
    pub training_metrics: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudLabel {
    Fraud,
    Legit,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudPrediction {
    pub fraud_probability: f64,
    pub label: FraudLabel,
}

/// First prediction of a scoring call together with the threshold it was judged against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FraudResult {
    pub probability: f64,
    pub label: FraudLabel,
    pub threshold: f64,
}

impl FraudResult {
    pub fn is_fraud(&self) -> bool {
        match self.label {
            FraudLabel::Fraud => true,
            FraudLabel::Legit => false,
            FraudLabel::Unknown => self.probability >= self.threshold,
        }
    }

    pub fn probability_text(&self) -> String {
        format_probability(self.probability)
    }

    pub fn decision_text(&self) -> &'static str {
        if self.is_fraud() {
            "FRAUD"
        } else {
            "LEGIT"
        }
    }
}

pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
