// HTTP request handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::middleware::{session_middleware, SESSION_HEADER};
use super::AppServer;
use crate::chat::{ChatMessage, ConversationSnapshot, Sender};
use crate::classifier::assess;
use crate::crisis::{AlertAction, AlertStats, CrisisAlert, CrisisResponse, RiskAnalysis};
use crate::errors::ApiError;
use crate::session::SessionIdentity;

/// Create the main application router
pub fn create_router(server: Arc<AppServer>) -> Router {
    use super::journal_handlers::{
        delete_entry, journal_stats, list_entries, save_entry, transcribe_audio,
    };

    // Journal and voice routes resolve identity from the session header
    let session_scoped = Router::new()
        .route("/journal/save", post(save_entry))
        .route("/journal/entries", get(list_entries))
        .route("/journal/stats", get(journal_stats))
        .route("/journal/:entry_id", delete(delete_entry))
        .route("/voice/transcribe", post(transcribe_audio))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&server),
            session_middleware,
        ))
        .with_state(Arc::clone(&server));

    Router::new()
        .route("/chat/start", post(start_chat))
        .route("/chat/:session_id/messages", get(get_messages))
        .route("/chat/:session_id/message", post(post_message))
        .route("/crisis/analyze", post(analyze_crisis))
        .route("/crisis/alerts/:session_id", get(recent_alerts))
        .route("/crisis/alert/:alert_id/resolve", patch(resolve_alert))
        .route("/crisis/stats/:session_id", get(crisis_stats))
        .route("/session/login", post(login))
        .route("/session/logout", post(logout))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server)
        .merge(session_scoped)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChatResponse {
    pub session_id: String,
}

/// Handle POST /chat/start
async fn start_chat(State(server): State<Arc<AppServer>>) -> Json<StartChatResponse> {
    let session_id = server.conversations().start();
    Json(StartChatResponse { session_id })
}

/// Handle GET /chat/:session_id/messages
async fn get_messages(
    State(server): State<Arc<AppServer>>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationSnapshot>, ApiError> {
    Ok(Json(server.conversations().history(&session_id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sender: Option<Sender>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(flatten)]
    pub conversation: ConversationSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
}

/// Handle POST /chat/:session_id/message - Main chat endpoint
///
/// User messages are scored, appended, and answered; a turn whose risk is
/// elevated short-circuits to the crisis intervention payload instead of the
/// language provider. Provider calls run between store operations, never
/// under a map guard.
async fn post_message(
    State(server): State<Arc<AppServer>>,
    Path(session_id): Path<String>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::validation("text is required"));
    }
    if !server.conversations().contains(&session_id) {
        return Err(ApiError::NotFound("session"));
    }

    server.metrics().messages_total.inc();
    let sender = request.sender.unwrap_or(Sender::User);

    if sender == Sender::Assistant {
        let conversation = server.conversations().append(
            &session_id,
            ChatMessage::assistant(&request.text),
            None,
        )?;
        return Ok(Json(MessageResponse {
            conversation,
            sentiment_score: None,
        }));
    }

    // Pattern window is captured before the append so the current message
    // doesn't count against its own history
    let history = server.pattern_history(&session_id);
    let sentiment = server.fetch_sentiment(&request.text).await;

    let assessment = assess(&request.text, sentiment);
    server.conversations().append(
        &session_id,
        ChatMessage::user(&request.text),
        Some(&assessment),
    )?;

    let reply_text = if assessment.risk.is_elevated() {
        tracing::warn!(
            session_id = %session_id,
            risk = %assessment.risk,
            "Elevated risk message, invoking crisis pipeline"
        );
        let (_, response, _) =
            server.run_crisis_pipeline(&session_id, &request.text, history, sentiment);
        response.render_text()
    } else {
        server.companion_reply(&session_id).await
    };

    let conversation =
        server
            .conversations()
            .append(&session_id, ChatMessage::assistant(&reply_text), None)?;

    Ok(Json(MessageResponse {
        conversation,
        sentiment_score: Some(assessment.sentiment.score),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: RiskAnalysis,
    pub response: CrisisResponse,
    pub alert_created: bool,
}

/// Handle POST /crisis/analyze
async fn analyze_crisis(
    State(server): State<Arc<AppServer>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::validation("text is required"))?;
    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::validation("sessionId is required"))?;

    let sentiment = server.fetch_sentiment(&text).await;
    let (analysis, response, alert_created) =
        server.run_crisis_pipeline(&session_id, &text, request.conversation_history, sentiment);

    Ok(Json(AnalyzeResponse {
        analysis,
        response,
        alert_created,
    }))
}

/// Handle GET /crisis/alerts/:session_id - most recent 10, newest first
async fn recent_alerts(
    State(server): State<Arc<AppServer>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<CrisisAlert>>, ApiError> {
    let alerts = server
        .alerts()
        .recent_for_session(&session_id, 10)
        .map_err(ApiError::Internal)?;
    Ok(Json(alerts))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub action_taken: AlertAction,
    #[serde(default = "default_resolved")]
    pub resolved: bool,
}

fn default_resolved() -> bool {
    true
}

/// Handle PATCH /crisis/alert/:alert_id/resolve
async fn resolve_alert(
    State(server): State<Arc<AppServer>>,
    Path(alert_id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<CrisisAlert>, ApiError> {
    let alert = server
        .alerts()
        .resolve(&alert_id, request.action_taken, request.resolved)
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("alert"))?;
    Ok(Json(alert))
}

/// Handle GET /crisis/stats/:session_id
async fn crisis_stats(
    State(server): State<Arc<AppServer>>,
    Path(session_id): Path<String>,
) -> Result<Json<AlertStats>, ApiError> {
    let stats = server
        .alerts()
        .stats_for_session(&session_id)
        .map_err(ApiError::Internal)?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: Option<String>,
}

/// Handle POST /session/login - create an authenticated session
async fn login(
    State(server): State<Arc<AppServer>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionIdentity>, ApiError> {
    let user_id = request
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::validation("userId is required"))?;
    Ok(Json(server.sessions().login(user_id)))
}

/// Handle POST /session/logout - delete the session named by the header
async fn logout(
    State(server): State<Arc<AppServer>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::validation("session token header is required"))?;

    if server.sessions().logout(token) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("session"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub active_sessions: usize,
    pub active_conversations: usize,
}

/// Handle GET /health
pub async fn health_check(State(server): State<Arc<AppServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        active_sessions: server.sessions().active_count(),
        active_conversations: server.conversations().active_count(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint(
    State(server): State<Arc<AppServer>>,
) -> Result<Response, ApiError> {
    let body = server.metrics().encode().map_err(ApiError::Internal)?;
    Ok((StatusCode::OK, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Mood;

    #[test]
    fn test_post_message_request_defaults() {
        let request: PostMessageRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(request.text, "hi");
        assert!(request.sender.is_none());

        let request: PostMessageRequest =
            serde_json::from_str(r#"{"text":"hi","sender":"assistant"}"#).unwrap();
        assert_eq!(request.sender, Some(Sender::Assistant));
    }

    #[test]
    fn test_resolve_request_defaults_to_resolved() {
        let request: ResolveRequest =
            serde_json::from_str(r#"{"actionTaken":"contacted_user"}"#).unwrap();
        assert!(request.resolved);
        assert_eq!(request.action_taken, AlertAction::ContactedUser);
    }

    #[test]
    fn test_mood_deserializes_lowercase() {
        let mood: Mood = serde_json::from_str(r#""anxious""#).unwrap();
        assert_eq!(mood, Mood::Anxious);
    }
}
