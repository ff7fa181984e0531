// Conversation transcript with derived mood state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::classifier::{Mood, MoodAssessment, RiskLevel};

/// Mood-history ring length
pub const MOOD_HISTORY_CAP: usize = 10;

/// Preview length (chars) stored on each mood-history entry
const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single transcript message, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant)
    }
}

/// One entry in the bounded mood-history ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodHistoryEntry {
    pub mood: Mood,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
}

/// Ordered transcript plus derived mood state for one session.
///
/// The mood/risk fields always reflect the most recently assessed user
/// message; assistant messages never mutate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub session_id: String,
    messages: Vec<ChatMessage>,
    pub mood: Mood,
    pub risk_level: RiskLevel,
    mood_history: VecDeque<MoodHistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            mood: Mood::Neutral,
            risk_level: RiskLevel::Low,
            mood_history: VecDeque::with_capacity(MOOD_HISTORY_CAP),
            created_at: Utc::now(),
        }
    }

    /// Append a message, preserving arrival order
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Fold a user-message assessment into the derived state and push a
    /// truncated-preview entry onto the mood-history ring, evicting the
    /// oldest entry once the ring holds MOOD_HISTORY_CAP.
    pub fn apply_assessment(&mut self, assessment: &MoodAssessment, source_text: &str) {
        self.mood = assessment.mood;
        self.risk_level = assessment.risk;

        if self.mood_history.len() >= MOOD_HISTORY_CAP {
            self.mood_history.pop_front();
        }
        self.mood_history.push_back(MoodHistoryEntry {
            mood: assessment.mood,
            timestamp: Utc::now(),
            preview: source_text.chars().take(PREVIEW_CHARS).collect(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn mood_history(&self) -> Vec<MoodHistoryEntry> {
        self.mood_history.iter().cloned().collect()
    }

    /// Most recent user-message texts, oldest first, for crisis pattern
    /// analysis
    pub fn recent_user_texts(&self, limit: usize) -> Vec<String> {
        let texts: Vec<String> = self
            .messages
            .iter()
            .filter(|m| m.sender == Sender::User)
            .map(|m| m.text.clone())
            .collect();
        let skip = texts.len().saturating_sub(limit);
        texts.into_iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::assess;

    #[test]
    fn test_append_preserves_order() {
        let mut conv = Conversation::new("s1");
        conv.append(ChatMessage::user("first"));
        conv.append(ChatMessage::assistant("second"));
        conv.append(ChatMessage::user("third"));

        let texts: Vec<&str> = conv.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_mood_history_capped_at_ten() {
        let mut conv = Conversation::new("s1");
        for i in 0..15 {
            let text = format!("I feel anxious about day {}", i);
            let assessment = assess(&text, None);
            conv.append(ChatMessage::user(&text));
            conv.apply_assessment(&assessment, &text);
        }

        let history = conv.mood_history();
        assert_eq!(history.len(), MOOD_HISTORY_CAP);
        // The stored entries are the last 10 in arrival order
        assert!(history[0].preview.contains("day 5"));
        assert!(history[9].preview.contains("day 14"));
    }

    #[test]
    fn test_preview_truncated() {
        let mut conv = Conversation::new("s1");
        let long = "a".repeat(200);
        let assessment = assess(&long, None);
        conv.apply_assessment(&assessment, &long);

        assert_eq!(conv.mood_history()[0].preview.chars().count(), 50);
    }

    #[test]
    fn test_mood_tracks_latest_user_message() {
        let mut conv = Conversation::new("s1");

        for text in ["I feel anxious", "I feel great"] {
            let assessment = assess(text, None);
            conv.append(ChatMessage::user(text));
            conv.apply_assessment(&assessment, text);
        }

        assert_eq!(conv.mood, Mood::Happy);
        assert_eq!(conv.mood_history().len(), 2);
        assert_eq!(conv.mood_history()[0].mood, Mood::Anxious);
        assert_eq!(conv.mood_history()[1].mood, Mood::Happy);
    }

    #[test]
    fn test_recent_user_texts_skips_assistant() {
        let mut conv = Conversation::new("s1");
        conv.append(ChatMessage::user("one"));
        conv.append(ChatMessage::assistant("reply"));
        conv.append(ChatMessage::user("two"));

        assert_eq!(conv.recent_user_texts(5), vec!["one", "two"]);
        assert_eq!(conv.recent_user_texts(1), vec!["two"]);
    }
}
