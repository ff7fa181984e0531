// Per-session journal entry store

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::classifier::{classify_mood, Mood};
use crate::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub title: Option<String>,
    pub content: String,
    pub mood: Mood,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Build an entry, classifying mood from the content when the caller
    /// didn't supply one
    pub fn new(content: impl Into<String>, title: Option<String>, mood: Option<Mood>) -> Self {
        let content = content.into();
        let mood = mood.unwrap_or_else(|| classify_mood(&content));
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            mood,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub entry_count: usize,
    pub mood_counts: BTreeMap<String, usize>,
    pub avg_entry_chars: f64,
    pub last_entry_at: Option<DateTime<Utc>>,
}

/// Journal entries keyed by session id. Every operation is scoped to one
/// session's entry list; there is no cross-session view.
pub struct JournalStore {
    entries: DashMap<String, Vec<JournalEntry>>,
}

impl JournalStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Append an entry to the session's list and return it
    pub fn save(&self, session_id: &str, entry: JournalEntry) -> JournalEntry {
        let mut list = self.entries.entry(session_id.to_string()).or_default();
        list.push(entry.clone());
        tracing::debug!(session_id = %session_id, entry_id = %entry.id, "Saved journal entry");
        entry
    }

    /// All entries for a session, newest first
    pub fn entries(&self, session_id: &str) -> Vec<JournalEntry> {
        let mut list = self
            .entries
            .get(session_id)
            .map(|l| l.clone())
            .unwrap_or_default();
        list.reverse();
        list
    }

    /// Delete one entry; NotFound when the session has no such entry
    pub fn delete(&self, session_id: &str, entry_id: &str) -> Result<(), ApiError> {
        let mut list = self
            .entries
            .get_mut(session_id)
            .ok_or(ApiError::NotFound("journal entry"))?;

        let before = list.len();
        list.retain(|e| e.id != entry_id);
        if list.len() == before {
            return Err(ApiError::NotFound("journal entry"));
        }
        Ok(())
    }

    pub fn stats(&self, session_id: &str) -> JournalStats {
        let list = self
            .entries
            .get(session_id)
            .map(|l| l.clone())
            .unwrap_or_default();

        let mut mood_counts: BTreeMap<String, usize> = BTreeMap::new();
        for entry in &list {
            *mood_counts.entry(entry.mood.as_str().to_string()).or_default() += 1;
        }

        let avg_entry_chars = if list.is_empty() {
            0.0
        } else {
            list.iter().map(|e| e.content.chars().count()).sum::<usize>() as f64
                / list.len() as f64
        };

        JournalStats {
            entry_count: list.len(),
            mood_counts,
            avg_entry_chars,
            last_entry_at: list.last().map(|e| e.created_at),
        }
    }
}

impl Default for JournalStore {
    fn default() -> Self {
        Self::new()
    }
}
