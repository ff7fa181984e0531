// Conversation trend analysis over recent sentiment values

use serde::{Deserialize, Serialize};

/// Direction a conversation is moving over its recent messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPattern {
    Stable,
    Improving,
    Deteriorating,
    CrisisEscalating,
}

/// Slope threshold separating stable from a real trend
pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;

/// Least-squares slope of `values` against message index.
/// Returns 0.0 when fewer than two values are present.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Classify a sentiment series into a pattern
pub fn pattern_from_slope(slope: f64) -> ConversationPattern {
    if slope < -TREND_SLOPE_THRESHOLD {
        ConversationPattern::Deteriorating
    } else if slope > TREND_SLOPE_THRESHOLD {
        ConversationPattern::Improving
    } else {
        ConversationPattern::Stable
    }
}
