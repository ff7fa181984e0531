// Classifier property tests

use solace::classifier::{assess, classify_mood, Mood, RiskLevel, SentimentScore};

fn neutral() -> SentimentScore {
    SentimentScore {
        score: 0.0,
        magnitude: 0.0,
        confidence: 0.9,
    }
}

#[test]
fn test_crisis_keywords_force_high_regardless_of_sentiment() {
    let texts = [
        "I want to kill myself",
        "thinking about suicide",
        "I want to die",
        "might as well end it all",
        "my life is not worth living",
    ];

    for text in texts {
        // Even a glowing external score must not downgrade
        let glowing = SentimentScore {
            score: 1.0,
            magnitude: 2.0,
            confidence: 0.9,
        };
        let assessment = assess(text, Some(glowing));
        assert_eq!(assessment.mood, Mood::Crisis, "text: {}", text);
        assert_eq!(assessment.risk, RiskLevel::High, "text: {}", text);
    }
}

#[test]
fn test_no_keywords_and_neutral_sentiment_is_neutral_low() {
    let assessment = assess("the train arrives at nine", Some(neutral()));
    assert_eq!(assessment.mood, Mood::Neutral);
    assert_eq!(assessment.risk, RiskLevel::Low);
}

#[test]
fn test_happy_exam_message_is_happy_low() {
    let assessment = assess("I'm so happy about my exam results", Some(neutral()));
    assert_eq!(assessment.mood, Mood::Happy);
    assert_eq!(assessment.risk, RiskLevel::Low);
}

#[test]
fn test_sentiment_tiers() {
    let high = SentimentScore {
        score: -0.7,
        magnitude: 0.9,
        confidence: 0.9,
    };
    assert_eq!(assess("plain words", Some(high)).risk, RiskLevel::High);

    let medium = SentimentScore {
        score: -0.4,
        magnitude: 0.6,
        confidence: 0.9,
    };
    assert_eq!(assess("plain words", Some(medium)).risk, RiskLevel::Medium);

    // Strong score with weak magnitude stays low
    let weak = SentimentScore {
        score: -0.9,
        magnitude: 0.2,
        confidence: 0.9,
    };
    assert_eq!(assess("plain words", Some(weak)).risk, RiskLevel::Low);
}

#[test]
fn test_mood_sets_are_checked_in_priority_order() {
    // Sad wins over happy because it is tested first
    assert_eq!(classify_mood("sad but trying to be happy"), Mood::Sad);
    // Crisis wins over everything
    assert_eq!(classify_mood("happy to end it all"), Mood::Crisis);
}
