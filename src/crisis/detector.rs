// Weighted crisis keyword detector

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::trend::{linear_slope, pattern_from_slope, ConversationPattern};
use crate::classifier::{lexicon_sentiment, RiskLevel, SentimentScore};

// Score contributions per matched phrase
const CRITICAL_WEIGHT: f64 = 25.0;
const HIGH_RISK_WEIGHT: f64 = 10.0;
const MEDIUM_RISK_WEIGHT: f64 = 5.0;
const CULTURAL_WEIGHT: f64 = 2.5;

// Increments for strongly negative external sentiment
const SENTIMENT_SEVERE_WEIGHT: f64 = 8.0;
const SENTIMENT_STRONG_WEIGHT: f64 = 5.0;
const SENTIMENT_MODERATE_WEIGHT: f64 = 2.0;

// Pattern adjustments over the recent-history window
const DETERIORATING_WEIGHT: f64 = 5.0;
const IMPROVING_WEIGHT: f64 = -3.0;
const ESCALATING_WEIGHT: f64 = 10.0;

// Cumulative-score thresholds
const CRITICAL_THRESHOLD: f64 = 20.0;
const HIGH_THRESHOLD: f64 = 10.0;
const MEDIUM_THRESHOLD: f64 = 5.0;

/// History window for conversation-pattern analysis
pub const PATTERN_WINDOW: usize = 5;

/// Matched phrase category used to select supplementary guidance text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CulturalContext {
    FamilyPressure,
    AcademicPressure,
    SocietalShame,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CulturalKeywords {
    pub family_pressure: Vec<String>,
    pub academic_pressure: Vec<String>,
    pub societal_shame: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisKeywords {
    pub critical: Vec<String>,
    pub high_risk: Vec<String>,
    pub medium_risk: Vec<String>,
    pub cultural: CulturalKeywords,
}

impl Default for CrisisKeywords {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            critical: owned(&[
                "kill myself",
                "suicide",
                "want to die",
                "end my life",
                "end it all",
                "not worth living",
                "better off dead",
                "no reason to live",
            ]),
            high_risk: owned(&[
                "hurt myself",
                "self harm",
                "cutting myself",
                "can't go on",
                "give up on everything",
                "hopeless",
                "no way out",
                "worthless",
            ]),
            medium_risk: owned(&[
                "hate myself",
                "hate my life",
                "tired of living",
                "what's the point",
                "nobody cares",
                "empty inside",
                "can't take it anymore",
                "everything is falling apart",
            ]),
            cultural: CulturalKeywords {
                family_pressure: owned(&[
                    "family pressure",
                    "parents don't understand",
                    "disappoint my family",
                    "letting my family down",
                    "arranged marriage",
                    "family honor",
                ]),
                academic_pressure: owned(&[
                    "exam",
                    "board exam",
                    "entrance exam",
                    "failed my exam",
                    "marks",
                    "rank",
                    "academic pressure",
                ]),
                societal_shame: owned(&[
                    "log kya kahenge",
                    "what will people say",
                    "shame on the family",
                    "society will judge",
                    "reputation ruined",
                ]),
            },
        }
    }
}

/// Per-message risk analysis result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub level: RiskLevel,
    pub score: f64,
    pub sentiment: SentimentScore,
    pub trigger_words: Vec<String>,
    pub cultural_contexts: Vec<CulturalContext>,
    pub pattern: ConversationPattern,
}

#[derive(Clone)]
pub struct CrisisDetector {
    keywords: CrisisKeywords,
}

impl CrisisDetector {
    pub fn new(keywords: CrisisKeywords) -> Self {
        Self { keywords }
    }

    /// Load crisis keywords from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read crisis keywords file: {}", path.display()))?;

        let keywords: CrisisKeywords =
            serde_json::from_str(&contents).context("Failed to parse crisis keywords JSON")?;

        Ok(Self { keywords })
    }

    /// Whether any critical keyword appears in the text
    pub fn contains_critical(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords
            .critical
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    }

    /// Analyze a message against the keyword tables, the external sentiment
    /// score when available, and the recent conversation history.
    ///
    /// A critical keyword match forces level Critical regardless of the
    /// cumulative numeric score.
    pub fn analyze(
        &self,
        text: &str,
        recent_history: &[String],
        external_sentiment: Option<SentimentScore>,
    ) -> RiskAnalysis {
        let lower = text.to_lowercase();
        let mut score = 0.0;
        let mut trigger_words = Vec::new();
        let mut critical_hit = false;

        for keyword in &self.keywords.critical {
            if lower.contains(&keyword.to_lowercase()) {
                tracing::warn!("Crisis detected: critical keyword '{}'", keyword);
                score += CRITICAL_WEIGHT;
                trigger_words.push(keyword.clone());
                critical_hit = true;
            }
        }

        for keyword in &self.keywords.high_risk {
            if lower.contains(&keyword.to_lowercase()) {
                score += HIGH_RISK_WEIGHT;
                trigger_words.push(keyword.clone());
            }
        }

        for keyword in &self.keywords.medium_risk {
            if lower.contains(&keyword.to_lowercase()) {
                score += MEDIUM_RISK_WEIGHT;
                trigger_words.push(keyword.clone());
            }
        }

        let cultural_contexts = self.match_cultural(&lower);
        score += cultural_contexts.len() as f64 * CULTURAL_WEIGHT;

        let sentiment = external_sentiment.unwrap_or_else(|| lexicon_sentiment(text));
        score += sentiment_increment(sentiment.score);

        let (pattern, pattern_adjustment) = self.conversation_pattern(recent_history);
        // An improving trend subtracts, but never below zero
        score = (score + pattern_adjustment).max(0.0);

        let level = if critical_hit {
            RiskLevel::Critical
        } else if score >= CRITICAL_THRESHOLD {
            RiskLevel::Critical
        } else if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        RiskAnalysis {
            level,
            score,
            sentiment,
            trigger_words,
            cultural_contexts,
            pattern,
        }
    }

    /// Classify the trajectory of the last PATTERN_WINDOW messages and return
    /// the pattern with its score adjustment.
    fn conversation_pattern(&self, history: &[String]) -> (ConversationPattern, f64) {
        let skip = history.len().saturating_sub(PATTERN_WINDOW);
        let window = &history[skip..];

        if window.len() < 2 {
            return (ConversationPattern::Stable, 0.0);
        }

        let critical_count = window.iter().filter(|m| self.contains_critical(m)).count();
        if critical_count >= 2 {
            tracing::warn!(
                critical_count,
                "Repeated critical keywords in recent history"
            );
            return (ConversationPattern::CrisisEscalating, ESCALATING_WEIGHT);
        }

        let sentiments: Vec<f64> = window.iter().map(|m| lexicon_sentiment(m).score).collect();
        let slope = linear_slope(&sentiments);

        match pattern_from_slope(slope) {
            ConversationPattern::Deteriorating => {
                (ConversationPattern::Deteriorating, DETERIORATING_WEIGHT)
            }
            ConversationPattern::Improving => (ConversationPattern::Improving, IMPROVING_WEIGHT),
            other => (other, 0.0),
        }
    }

    fn match_cultural(&self, lower: &str) -> Vec<CulturalContext> {
        let table = [
            (
                CulturalContext::FamilyPressure,
                &self.keywords.cultural.family_pressure,
            ),
            (
                CulturalContext::AcademicPressure,
                &self.keywords.cultural.academic_pressure,
            ),
            (
                CulturalContext::SocietalShame,
                &self.keywords.cultural.societal_shame,
            ),
        ];

        table
            .iter()
            .filter(|(_, words)| words.iter().any(|w| lower.contains(&w.to_lowercase())))
            .map(|(context, _)| *context)
            .collect()
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(CrisisKeywords::default())
    }
}

fn sentiment_increment(score: f64) -> f64 {
    if score <= -0.8 {
        SENTIMENT_SEVERE_WEIGHT
    } else if score <= -0.6 {
        SENTIMENT_STRONG_WEIGHT
    } else if score <= -0.4 {
        SENTIMENT_MODERATE_WEIGHT
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_sentiment() -> SentimentScore {
        SentimentScore {
            score: 0.0,
            magnitude: 0.0,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_critical_keyword_forces_critical() {
        let detector = CrisisDetector::default();
        let analysis = detector.analyze("I want to kill myself", &[], Some(neutral_sentiment()));

        assert_eq!(analysis.level, RiskLevel::Critical);
        assert!(analysis.trigger_words.contains(&"kill myself".to_string()));
    }

    #[test]
    fn test_critical_overrides_positive_sentiment() {
        let detector = CrisisDetector::default();
        let positive = SentimentScore {
            score: 0.9,
            magnitude: 1.0,
            confidence: 0.9,
        };
        let analysis = detector.analyze("thinking about suicide", &[], Some(positive));
        assert_eq!(analysis.level, RiskLevel::Critical);
    }

    #[test]
    fn test_single_high_risk_phrase_is_high() {
        let detector = CrisisDetector::default();
        let analysis = detector.analyze("I just feel hopeless", &[], Some(neutral_sentiment()));
        assert_eq!(analysis.level, RiskLevel::High);
        assert_eq!(analysis.score, 10.0);
    }

    #[test]
    fn test_single_medium_risk_phrase_is_medium() {
        let detector = CrisisDetector::default();
        let analysis = detector.analyze(
            "some days I hate my life",
            &[],
            Some(neutral_sentiment()),
        );
        assert_eq!(analysis.level, RiskLevel::Medium);
        assert_eq!(analysis.score, 5.0);
    }

    #[test]
    fn test_neutral_text_is_low() {
        let detector = CrisisDetector::default();
        let analysis = detector.analyze("lunch was good today", &[], Some(neutral_sentiment()));
        assert_eq!(analysis.level, RiskLevel::Low);
        assert_eq!(analysis.score, 0.0);
        assert!(analysis.trigger_words.is_empty());
    }

    #[test]
    fn test_cultural_context_tagging() {
        let detector = CrisisDetector::default();
        let analysis = detector.analyze(
            "the family pressure about my board exam is too much",
            &[],
            Some(neutral_sentiment()),
        );

        assert!(analysis
            .cultural_contexts
            .contains(&CulturalContext::FamilyPressure));
        assert!(analysis
            .cultural_contexts
            .contains(&CulturalContext::AcademicPressure));
        assert_eq!(analysis.score, 5.0);
        assert_eq!(analysis.level, RiskLevel::Medium);
    }

    #[test]
    fn test_negative_sentiment_increments_score() {
        let detector = CrisisDetector::default();
        let severe = SentimentScore {
            score: -0.9,
            magnitude: 1.2,
            confidence: 0.9,
        };
        let analysis = detector.analyze("I just feel hopeless", &[], Some(severe));
        // 10 for the phrase + 8 for severe sentiment
        assert_eq!(analysis.score, 18.0);
        assert_eq!(analysis.level, RiskLevel::High);
    }

    #[test]
    fn test_deteriorating_history_adds_increment() {
        let detector = CrisisDetector::default();
        let history = vec![
            "today was good and happy".to_string(),
            "feeling good".to_string(),
            "a bit tired".to_string(),
            "feeling sad and tired".to_string(),
            "sad lonely and miserable".to_string(),
        ];
        let analysis = detector.analyze(
            "some days I hate my life",
            &history,
            Some(neutral_sentiment()),
        );
        assert_eq!(analysis.pattern, ConversationPattern::Deteriorating);
        assert_eq!(analysis.score, 10.0);
        assert_eq!(analysis.level, RiskLevel::High);
    }

    #[test]
    fn test_improving_history_never_goes_negative() {
        let detector = CrisisDetector::default();
        let history = vec![
            "sad lonely and miserable".to_string(),
            "feeling sad".to_string(),
            "a bit better".to_string(),
            "feeling good".to_string(),
            "happy and grateful today".to_string(),
        ];
        let analysis = detector.analyze("all fine now", &history, Some(neutral_sentiment()));
        assert_eq!(analysis.pattern, ConversationPattern::Improving);
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.level, RiskLevel::Low);
    }

    #[test]
    fn test_repeated_criticals_escalate() {
        let detector = CrisisDetector::default();
        let history = vec![
            "I want to die".to_string(),
            "nothing matters".to_string(),
            "thinking about suicide again".to_string(),
        ];
        let analysis = detector.analyze(
            "some days I hate my life",
            &history,
            Some(neutral_sentiment()),
        );
        assert_eq!(analysis.pattern, ConversationPattern::CrisisEscalating);
        // 5 for the phrase + 10 escalation
        assert_eq!(analysis.score, 15.0);
        assert_eq!(analysis.level, RiskLevel::High);
    }

    #[test]
    fn test_load_from_file() {
        let keywords = CrisisKeywords::default();
        let json = serde_json::to_string(&keywords).unwrap();
        let dir = std::env::temp_dir().join("solace_detector_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("crisis_keywords.json");
        std::fs::write(&path, json).unwrap();

        let detector = CrisisDetector::load_from_file(&path).unwrap();
        assert!(detector.contains_critical("suicide"));

        let _ = std::fs::remove_file(&path);
    }
}
