// Journal and voice endpoint handlers
//
// All routes here sit behind the session middleware: identity arrives via
// request extensions and every operation is scoped to that session's data.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::timeout;

use super::AppServer;
use crate::classifier::Mood;
use crate::errors::ApiError;
use crate::journal::{JournalEntry, JournalStats};
use crate::session::SessionIdentity;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEntryRequest {
    pub content: Option<String>,
    pub title: Option<String>,
    pub mood: Option<Mood>,
}

/// Handle POST /journal/save
pub async fn save_entry(
    State(server): State<Arc<AppServer>>,
    Extension(identity): Extension<SessionIdentity>,
    Json(request): Json<SaveEntryRequest>,
) -> Result<Json<JournalEntry>, ApiError> {
    let content = request
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::validation("content is required"))?;

    let entry = JournalEntry::new(content, request.title, request.mood);
    Ok(Json(server.journal().save(&identity.session_id, entry)))
}

/// Handle GET /journal/entries - newest first
pub async fn list_entries(
    State(server): State<Arc<AppServer>>,
    Extension(identity): Extension<SessionIdentity>,
) -> Json<Vec<JournalEntry>> {
    Json(server.journal().entries(&identity.session_id))
}

/// Handle DELETE /journal/:entry_id
pub async fn delete_entry(
    State(server): State<Arc<AppServer>>,
    Extension(identity): Extension<SessionIdentity>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    server.journal().delete(&identity.session_id, &entry_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle GET /journal/stats
pub async fn journal_stats(
    State(server): State<Arc<AppServer>>,
    Extension(identity): Extension<SessionIdentity>,
) -> Json<JournalStats> {
    Json(server.journal().stats(&identity.session_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    pub audio: Option<String>,
    pub language_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Handle POST /voice/transcribe
pub async fn transcribe_audio(
    State(server): State<Arc<AppServer>>,
    Json(request): Json<TranscribeRequest>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let audio = request
        .audio
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::validation("audio is required"))?;

    let provider = server
        .transcription()
        .ok_or_else(|| ApiError::Upstream(anyhow::anyhow!("no transcription provider configured")))?;

    let text = timeout(
        server.provider_timeout(),
        provider.transcribe(&audio, request.language_code.as_deref()),
    )
    .await
    .map_err(|_| ApiError::Upstream(anyhow::anyhow!("transcription provider timed out")))?
    .map_err(ApiError::Upstream)?;

    Ok(Json(TranscribeResponse { text }))
}
