// External provider interfaces
//
// The generative-language, sentiment, and speech-to-text services sit behind
// narrow traits so the classifier and detector logic can be tested without
// network access. Every implementation carries a bounded request timeout, and
// callers treat any error as a provider failure to degrade from.

use anyhow::Result;
use async_trait::async_trait;

mod fallback;
mod gemini;
mod sentiment;
mod transcribe;

pub use fallback::CannedReplies;
pub use gemini::GeminiProvider;
pub use sentiment::GoogleSentimentProvider;
pub use transcribe::GoogleSpeechProvider;

use crate::chat::ChatMessage;
use crate::classifier::SentimentScore;

/// Generative-language provider producing the assistant's next turn
#[async_trait]
pub trait LanguageProvider: Send + Sync {
    /// Generate a reply to the conversation so far (oldest message first)
    async fn generate_reply(&self, history: &[ChatMessage]) -> Result<String>;

    fn name(&self) -> &str;
}

/// External sentiment scorer (score in [-1, 1], magnitude >= 0)
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentScore>;

    fn name(&self) -> &str;
}

/// Speech-to-text provider for voice journaling
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe base64-encoded audio
    async fn transcribe(&self, audio_base64: &str, language_code: Option<&str>) -> Result<String>;

    fn name(&self) -> &str;
}
