// Concurrent conversation store keyed by session id

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use super::{ChatMessage, Conversation, MoodHistoryEntry, Sender};
use crate::classifier::{Mood, MoodAssessment, RiskLevel};
use crate::errors::ApiError;

/// Read view of a conversation returned to handlers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    pub mood: Mood,
    pub risk_level: RiskLevel,
    pub mood_history: Vec<MoodHistoryEntry>,
}

impl From<&Conversation> for ConversationSnapshot {
    fn from(conv: &Conversation) -> Self {
        Self {
            session_id: conv.session_id.clone(),
            messages: conv.messages().to_vec(),
            mood: conv.mood,
            risk_level: conv.risk_level,
            mood_history: conv.mood_history(),
        }
    }
}

/// Conversation table backed by DashMap.
///
/// Every mutation happens under the per-key entry guard, so two
/// near-simultaneous appends to the same session cannot interleave or lose
/// an update. Guards are never held across an await point; provider calls
/// run between store operations.
pub struct ConversationStore {
    conversations: DashMap<String, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: DashMap::new(),
        }
    }

    /// Create a new empty conversation and return its session id
    pub fn start(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.conversations
            .insert(session_id.clone(), Conversation::new(&session_id));
        tracing::info!(session_id = %session_id, "Started conversation");
        session_id
    }

    /// Create an empty conversation for an externally minted session id if
    /// one does not exist yet
    pub fn ensure(&self, session_id: &str) {
        self.conversations
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation::new(session_id));
    }

    /// Append a message. For user-authored messages the caller supplies the
    /// mood/risk assessment, which updates the derived state and the
    /// mood-history ring; assistant messages leave both untouched.
    pub fn append(
        &self,
        session_id: &str,
        message: ChatMessage,
        assessment: Option<&MoodAssessment>,
    ) -> Result<ConversationSnapshot, ApiError> {
        let mut entry = self
            .conversations
            .get_mut(session_id)
            .ok_or(ApiError::NotFound("session"))?;

        let text = message.text.clone();
        let sender = message.sender;
        entry.append(message);

        if sender == Sender::User {
            if let Some(assessment) = assessment {
                entry.apply_assessment(assessment, &text);
            }
        }

        Ok(ConversationSnapshot::from(&*entry))
    }

    /// Full transcript plus derived state
    pub fn history(&self, session_id: &str) -> Result<ConversationSnapshot, ApiError> {
        let entry = self
            .conversations
            .get(session_id)
            .ok_or(ApiError::NotFound("session"))?;
        Ok(ConversationSnapshot::from(&*entry))
    }

    /// Recent user-message texts for crisis pattern analysis; empty when the
    /// session is unknown
    pub fn recent_user_texts(&self, session_id: &str, limit: usize) -> Vec<String> {
        self.conversations
            .get(session_id)
            .map(|conv| conv.recent_user_texts(limit))
            .unwrap_or_default()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.conversations.contains_key(session_id)
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.conversations.remove(session_id).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.conversations.len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::assess;

    #[test]
    fn test_start_then_append_succeeds() {
        let store = ConversationStore::new();
        let id = store.start();

        let assessment = assess("hello there", None);
        let snapshot = store
            .append(&id, ChatMessage::user("hello there"), Some(&assessment))
            .unwrap();

        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.mood, Mood::Neutral);
    }

    #[test]
    fn test_append_unknown_session_is_not_found() {
        let store = ConversationStore::new();
        let result = store.append("missing", ChatMessage::user("hi"), None);
        assert!(matches!(result, Err(ApiError::NotFound("session"))));
    }

    #[test]
    fn test_history_unknown_session_is_not_found() {
        let store = ConversationStore::new();
        assert!(matches!(
            store.history("missing"),
            Err(ApiError::NotFound("session"))
        ));
    }

    #[test]
    fn test_assistant_message_does_not_mutate_mood() {
        let store = ConversationStore::new();
        let id = store.start();

        let assessment = assess("I feel anxious", None);
        store
            .append(&id, ChatMessage::user("I feel anxious"), Some(&assessment))
            .unwrap();

        let snapshot = store
            .append(&id, ChatMessage::assistant("I'm terribly sad to hear that"), None)
            .unwrap();

        assert_eq!(snapshot.mood, Mood::Anxious);
        assert_eq!(snapshot.mood_history.len(), 1);
    }

    #[test]
    fn test_history_returns_arrival_order() {
        let store = ConversationStore::new();
        let id = store.start();

        for i in 0..5 {
            let text = format!("message {}", i);
            let assessment = assess(&text, None);
            store
                .append(&id, ChatMessage::user(&text), Some(&assessment))
                .unwrap();
        }

        let snapshot = store.history(&id).unwrap();
        let texts: Vec<&str> = snapshot.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["message 0", "message 1", "message 2", "message 3", "message 4"]
        );
    }
}
