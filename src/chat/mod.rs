// Conversation state module
// Public interface for per-session transcripts and mood history

mod conversation;
mod store;

pub use conversation::{ChatMessage, Conversation, MoodHistoryEntry, Sender, MOOD_HISTORY_CAP};
pub use store::{ConversationSnapshot, ConversationStore};
