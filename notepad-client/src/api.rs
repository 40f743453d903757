use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

/// Failures shown to the user as a short status; details go to the log.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to load")]
    LoadFailed(StatusCode),

    #[error("Failed to save")]
    SaveFailed(StatusCode),

    #[error("Failed to load")]
    LoadTransport(#[source] reqwest::Error),

    #[error("Failed to save")]
    SaveTransport(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSnapshot {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Where the editor loads the note from and saves it to.
pub trait NoteBackend {
    async fn load(&self) -> Result<NoteSnapshot, ClientError>;
    async fn save(&self, content: &str) -> Result<SaveReceipt, ClientError>;
}

/// HTTP client for `/api/note`.
pub struct NoteApi {
    http: reqwest::Client,
    note_url: String,
}

impl NoteApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            note_url: format!("{}/api/note", base_url.trim_end_matches('/')),
        }
    }
}

impl NoteBackend for NoteApi {
    async fn load(&self) -> Result<NoteSnapshot, ClientError> {
        let transport = |e: reqwest::Error| {
            tracing::warn!("GET {} failed: {e}", self.note_url);
            ClientError::LoadTransport(e)
        };

        let response = self
            .http
            .get(&self.note_url)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            tracing::warn!("GET {} returned {}", self.note_url, response.status());
            return Err(ClientError::LoadFailed(response.status()));
        }
        response.json().await.map_err(transport)
    }

    async fn save(&self, content: &str) -> Result<SaveReceipt, ClientError> {
        let transport = |e: reqwest::Error| {
            tracing::warn!("POST {} failed: {e}", self.note_url);
            ClientError::SaveTransport(e)
        };

        let response = self
            .http
            .post(&self.note_url)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            tracing::warn!("POST {} returned {}", self.note_url, response.status());
            return Err(ClientError::SaveFailed(response.status()));
        }
        response.json().await.map_err(transport)
    }
}
