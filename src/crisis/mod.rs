// Crisis detection module
// Public interface for weighted risk scoring, intervention payloads, and
// durable alert records

mod alerts;
mod detector;
mod response;
mod trend;

pub use alerts::{
    AlertAction, AlertStats, AlertStore, CrisisAlert, LevelStats, MemoryAlertStore, SledAlertStore,
};
pub use detector::{
    CrisisDetector, CrisisKeywords, CulturalContext, CulturalKeywords, RiskAnalysis, PATTERN_WINDOW,
};
pub use response::{
    generate_crisis_response, safety_fallback_response, CrisisResponse, CulturalGuidance, Helpline,
};
pub use trend::{linear_slope, pattern_from_slope, ConversationPattern, TREND_SLOPE_THRESHOLD};
