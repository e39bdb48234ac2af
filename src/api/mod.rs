pub mod client;
pub mod lookup;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::BackendClient;

/// Body of `POST /api/process_command`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandRequest {
    pub command: String,
}

/// Reply to a dispatched command. The backend sends either `response` or
/// `error`, and may attach its view of the command history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommandResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub command: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TipResponse {
    pub tip: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TimeResponse {
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Error envelope the backend uses on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Credentials handed out by `/api/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}")]
    Status {
        status: u16,
        /// `error` field of the body, when the backend sent one.
        message: Option<String>,
    },

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Server-provided explanation, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Everything the client asks of the assistant backend.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn process_command(&self, command: &str) -> Result<CommandResponse, ApiError>;
    async fn health(&self) -> Result<HealthResponse, ApiError>;
    async fn tip(&self) -> Result<String, ApiError>;
    async fn time(&self) -> Result<String, ApiError>;
    async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError>;
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError>;
}
