// Mood and risk classification
// Public interface for per-message mood/risk tagging

mod mood;
mod sentiment;

pub use mood::{classify_mood, contains_crisis_phrase, Mood, RiskLevel};
pub use sentiment::{lexicon_sentiment, risk_from_sentiment, SentimentScore};

/// Combined mood/risk assessment for a single user message
#[derive(Debug, Clone)]
pub struct MoodAssessment {
    pub mood: Mood,
    pub risk: RiskLevel,
    pub sentiment: SentimentScore,
}

/// Assess a message body, folding in an external sentiment score when one
/// is available and falling back to the lexicon otherwise.
///
/// A crisis-phrase match always forces risk to at least High; a
/// sentiment-derived level never downgrades it.
pub fn assess(text: &str, external: Option<SentimentScore>) -> MoodAssessment {
    let mood = classify_mood(text);
    let sentiment = external.unwrap_or_else(|| lexicon_sentiment(text));

    let sentiment_risk = risk_from_sentiment(sentiment.score, sentiment.magnitude);
    let risk = if mood == Mood::Crisis {
        RiskLevel::High.max(sentiment_risk)
    } else {
        sentiment_risk
    };

    MoodAssessment {
        mood,
        risk,
        sentiment,
    }
}
