// Keyword-table mood classifier

use serde::{Deserialize, Serialize};

/// Coarse emotional-state label for a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Crisis,
    Sad,
    Anxious,
    Angry,
    Happy,
    Stressed,
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Crisis => "crisis",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Angry => "angry",
            Mood::Happy => "happy",
            Mood::Stressed => "stressed",
            Mood::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal risk classification, Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn is_elevated(&self) -> bool {
        *self > RiskLevel::Low
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phrases that short-circuit all other scoring
const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "want to die",
    "end it all",
    "end my life",
    "not worth living",
    "better off dead",
    "no reason to live",
];

/// (mood, keywords) checked in order; first match wins.
/// The happy set is tested before the academic-stress set, so a message
/// like "so happy about my exam results" classifies as happy.
const MOOD_TABLE: &[(Mood, &[&str])] = &[
    (
        Mood::Sad,
        &[
            "sad",
            "depressed",
            "unhappy",
            "miserable",
            "crying",
            "lonely",
            "heartbroken",
            "grief",
        ],
    ),
    (
        Mood::Anxious,
        &[
            "anxious",
            "anxiety",
            "worried",
            "nervous",
            "panic",
            "scared",
            "afraid",
            "overwhelmed",
        ],
    ),
    (
        Mood::Angry,
        &[
            "angry", "furious", "mad at", "frustrated", "irritated", "annoyed", "resent",
        ],
    ),
    (
        Mood::Happy,
        &[
            "happy",
            "great",
            "excited",
            "grateful",
            "wonderful",
            "amazing",
            "joyful",
            "relieved",
        ],
    ),
    (
        Mood::Stressed,
        &[
            "exam",
            "marks",
            "grades",
            "deadline",
            "studies",
            "assignment",
            "workload",
        ],
    ),
];

/// Check for membership in the crisis phrase set
pub fn contains_crisis_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRISIS_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Classify a message body into a mood label.
/// A crisis phrase match overrides everything else.
pub fn classify_mood(text: &str) -> Mood {
    let lower = text.to_lowercase();

    for phrase in CRISIS_PHRASES {
        if lower.contains(phrase) {
            tracing::warn!("Crisis phrase detected: '{}'", phrase);
            return Mood::Crisis;
        }
    }

    for (mood, keywords) in MOOD_TABLE {
        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            return *mood;
        }
    }

    Mood::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crisis_phrases_short_circuit() {
        assert_eq!(classify_mood("I want to kill myself"), Mood::Crisis);
        assert_eq!(classify_mood("life is not worth living anymore"), Mood::Crisis);
        // Even alongside a happy keyword
        assert_eq!(classify_mood("I am happy to end it all"), Mood::Crisis);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify_mood("SUICIDE"), Mood::Crisis);
        assert_eq!(classify_mood("I feel ANXIOUS"), Mood::Anxious);
    }

    #[test]
    fn test_mood_buckets() {
        assert_eq!(classify_mood("I feel so lonely tonight"), Mood::Sad);
        assert_eq!(classify_mood("I'm nervous about tomorrow"), Mood::Anxious);
        assert_eq!(classify_mood("I'm furious with my boss"), Mood::Angry);
        assert_eq!(classify_mood("what a wonderful day"), Mood::Happy);
        assert_eq!(classify_mood("the deadline is crushing me"), Mood::Stressed);
    }

    #[test]
    fn test_happy_precedes_academic_stress() {
        assert_eq!(
            classify_mood("I'm so happy about my exam results"),
            Mood::Happy
        );
    }

    #[test]
    fn test_defaults_to_neutral() {
        assert_eq!(classify_mood("what time is it"), Mood::Neutral);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert!(!RiskLevel::Low.is_elevated());
        assert!(RiskLevel::Medium.is_elevated());
    }
}
