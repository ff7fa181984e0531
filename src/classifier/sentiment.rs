// Lexicon sentiment scoring and sentiment-to-risk mapping

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::RiskLevel;

/// Sentiment score in the external provider's convention:
/// score in [-1, 1], magnitude >= 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentScore {
    pub score: f64,
    pub magnitude: f64,
    pub confidence: f64,
}

const POSITIVE_WORDS: &[&str] = &[
    "happy", "good", "great", "better", "hopeful", "grateful", "calm", "proud", "excited",
    "wonderful", "amazing", "relieved", "loved",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "bad", "awful", "terrible", "hopeless", "worthless", "alone", "lonely", "miserable",
    "angry", "scared", "anxious", "tired", "empty", "hate",
];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z']+").expect("valid word regex"));

/// Crude lexicon fallback used when the external sentiment provider is
/// unavailable: +/-0.3 per matched word, clamped to [-1, 1], with a fixed
/// magnitude of 0.5 and confidence of 0.6.
pub fn lexicon_sentiment(text: &str) -> SentimentScore {
    let lower = text.to_lowercase();
    let mut score = 0.0_f64;

    for word in WORD_RE.find_iter(&lower) {
        let word = word.as_str();
        if POSITIVE_WORDS.contains(&word) {
            score += 0.3;
        } else if NEGATIVE_WORDS.contains(&word) {
            score -= 0.3;
        }
    }

    SentimentScore {
        score: score.clamp(-1.0, 1.0),
        magnitude: 0.5,
        confidence: 0.6,
    }
}

/// Map an external sentiment score to a risk level
pub fn risk_from_sentiment(score: f64, magnitude: f64) -> RiskLevel {
    if score < -0.6 && magnitude > 0.8 {
        RiskLevel::High
    } else if score < -0.3 && magnitude > 0.5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_positive() {
        let s = lexicon_sentiment("I feel happy and grateful");
        assert!((s.score - 0.6).abs() < 1e-9);
        assert_eq!(s.magnitude, 0.5);
        assert_eq!(s.confidence, 0.6);
    }

    #[test]
    fn test_lexicon_negative_clamped() {
        let s = lexicon_sentiment("sad awful terrible hopeless alone");
        assert_eq!(s.score, -1.0);
    }

    #[test]
    fn test_lexicon_word_boundaries() {
        // "sadness" contains "sad" as a substring but is a different token
        let s = lexicon_sentiment("sadness");
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_risk_tiers() {
        assert_eq!(risk_from_sentiment(-0.7, 0.9), RiskLevel::High);
        assert_eq!(risk_from_sentiment(-0.4, 0.6), RiskLevel::Medium);
        assert_eq!(risk_from_sentiment(-0.7, 0.5), RiskLevel::Low);
        assert_eq!(risk_from_sentiment(0.5, 2.0), RiskLevel::Low);
    }
}
