// Tiered crisis response templates
//
// The response bodies are modeled as data tables keyed by level so the text
// can be localized and tested without touching control flow.

use serde::Serialize;

use super::detector::{CulturalContext, RiskAnalysis};
use crate::classifier::RiskLevel;

#[derive(Debug, Clone, Serialize)]
pub struct Helpline {
    pub name: &'static str,
    pub contact: &'static str,
    pub hours: &'static str,
}

const AASRA: Helpline = Helpline {
    name: "AASRA",
    contact: "91-9820466726",
    hours: "24x7",
};

const ICALL: Helpline = Helpline {
    name: "iCall",
    contact: "9152987821",
    hours: "Mon-Sat 10am-8pm",
};

const VANDREVALA: Helpline = Helpline {
    name: "Vandrevala Foundation",
    contact: "1860-2662-345",
    hours: "24x7",
};

const KIRAN: Helpline = Helpline {
    name: "Kiran (Govt. of India)",
    contact: "1800-599-0019",
    hours: "24x7",
};

const EMERGENCY: Helpline = Helpline {
    name: "Emergency Services",
    contact: "112",
    hours: "24x7",
};

struct ResponseTemplate {
    priority: &'static str,
    message: &'static str,
    helplines: &'static [Helpline],
    actions: &'static [&'static str],
}

const CRITICAL_TEMPLATE: ResponseTemplate = ResponseTemplate {
    priority: "immediate",
    message: "I'm really concerned about what you've shared. You don't have to face this \
              alone, and you deserve support right now. Please reach out to one of these \
              helplines immediately. They are free, confidential, and someone is there to \
              listen.",
    helplines: &[AASRA, VANDREVALA, KIRAN, EMERGENCY],
    actions: &[
        "Call a helpline now, or ask someone nearby to call with you",
        "If you are in immediate danger, call 112",
        "Stay with someone you trust until you feel safer",
        "Remove anything you might use to harm yourself",
    ],
};

const HIGH_TEMPLATE: ResponseTemplate = ResponseTemplate {
    priority: "urgent",
    message: "What you're going through sounds incredibly heavy. These feelings can ease \
              with support, and talking to a trained counselor can genuinely help. Please \
              consider reaching out to one of these helplines today.",
    helplines: &[AASRA, ICALL, VANDREVALA],
    actions: &[
        "Talk to a counselor on one of the helplines",
        "Tell a trusted friend or family member how you're feeling",
        "Try to avoid being alone for long stretches today",
    ],
};

const MEDIUM_TEMPLATE: ResponseTemplate = ResponseTemplate {
    priority: "supportive",
    message: "It sounds like things have been difficult lately. Your feelings are valid, \
              and support is available if it ever feels like too much. Here are some \
              resources you can lean on.",
    helplines: &[AASRA, ICALL],
    actions: &[
        "Consider journaling about what's been weighing on you",
        "Reach out to someone you trust",
        "A helpline counselor can also just listen, even without a crisis",
    ],
};

fn template_for(level: RiskLevel) -> &'static ResponseTemplate {
    match level {
        RiskLevel::Critical => &CRITICAL_TEMPLATE,
        RiskLevel::High => &HIGH_TEMPLATE,
        _ => &MEDIUM_TEMPLATE,
    }
}

/// (context, guidance) pairs; a message can trigger more than one
const CULTURAL_GUIDANCE: &[(CulturalContext, &str)] = &[
    (
        CulturalContext::FamilyPressure,
        "Family expectations can feel like the whole world, but your worth is not measured \
         by anyone's approval. A counselor who understands family dynamics can help you \
         find ways to talk to your family, or to set boundaries where talking isn't safe.",
    ),
    (
        CulturalContext::AcademicPressure,
        "One exam or one result does not decide your life. Many people who struggled \
         academically found paths they love. If studies feel crushing, a counselor can \
         help you untangle the pressure from your own goals.",
    ),
    (
        CulturalContext::SocietalShame,
        "\"What will people say\" is a heavy burden that is not yours to carry. Seeking \
         help is a sign of strength, not shame, and helplines are completely confidential.",
    ),
];

#[derive(Debug, Clone, Serialize)]
pub struct CulturalGuidance {
    pub context: CulturalContext,
    pub guidance: &'static str,
}

/// Multi-section intervention payload returned to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisResponse {
    pub level: RiskLevel,
    pub priority: &'static str,
    pub message: String,
    pub helplines: Vec<Helpline>,
    pub suggested_actions: Vec<String>,
    pub cultural_guidance: Vec<CulturalGuidance>,
}

impl CrisisResponse {
    /// Flatten the payload into a single message body suitable for use as an
    /// assistant chat turn
    pub fn render_text(&self) -> String {
        let mut out = String::from(&self.message);
        out.push_str("\n\nHelplines:\n");
        for line in &self.helplines {
            out.push_str(&format!("  {} : {} ({})\n", line.name, line.contact, line.hours));
        }
        for block in &self.cultural_guidance {
            out.push('\n');
            out.push_str(block.guidance);
            out.push('\n');
        }
        out
    }
}

/// Select the tiered response body for an analysis result, appending
/// culturally targeted guidance blocks for each matched context.
pub fn generate_crisis_response(analysis: &RiskAnalysis) -> CrisisResponse {
    let template = template_for(analysis.level);

    let cultural_guidance = CULTURAL_GUIDANCE
        .iter()
        .filter(|(context, _)| analysis.cultural_contexts.contains(context))
        .map(|(context, guidance)| CulturalGuidance {
            context: *context,
            guidance,
        })
        .collect();

    CrisisResponse {
        level: analysis.level,
        priority: template.priority,
        message: template.message.to_string(),
        helplines: template.helplines.to_vec(),
        suggested_actions: template.actions.iter().map(|a| a.to_string()).collect(),
        cultural_guidance,
    }
}

/// Fixed fallback used when the analysis pipeline itself fails. Risk-relevant
/// paths must never fail silently, so this always carries helpline contacts.
pub fn safety_fallback_response() -> CrisisResponse {
    CrisisResponse {
        level: RiskLevel::High,
        priority: "urgent",
        message: "I'm having trouble processing right now, but if you are struggling, \
                  please don't wait for me. Trained counselors are available around the \
                  clock."
            .to_string(),
        helplines: vec![AASRA, KIRAN, EMERGENCY],
        suggested_actions: vec![
            "Call AASRA at 91-9820466726".to_string(),
            "If you are in immediate danger, call 112".to_string(),
        ],
        cultural_guidance: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::CrisisDetector;

    #[test]
    fn test_critical_response_contains_aasra() {
        let detector = CrisisDetector::default();
        let analysis = detector.analyze("I want to kill myself", &[], None);
        let response = generate_crisis_response(&analysis);

        assert_eq!(response.level, RiskLevel::Critical);
        assert_eq!(response.priority, "immediate");
        assert!(response.helplines.iter().any(|h| h.name == "AASRA"));
        assert!(response.render_text().contains("AASRA"));
    }

    #[test]
    fn test_tiers_select_distinct_templates() {
        let detector = CrisisDetector::default();

        let high = detector.analyze("I just feel hopeless", &[], None);
        let medium = detector.analyze("some days I hate my life", &[], None);

        let high_resp = generate_crisis_response(&high);
        let medium_resp = generate_crisis_response(&medium);

        assert_eq!(high_resp.priority, "urgent");
        assert_eq!(medium_resp.priority, "supportive");
        assert_ne!(high_resp.message, medium_resp.message);
    }

    #[test]
    fn test_cultural_blocks_are_independently_addable() {
        let detector = CrisisDetector::default();
        let analysis = detector.analyze(
            "family pressure over my board exam results, log kya kahenge",
            &[],
            None,
        );
        let response = generate_crisis_response(&analysis);

        assert_eq!(response.cultural_guidance.len(), 3);
    }

    #[test]
    fn test_safety_fallback_has_helpline() {
        let fallback = safety_fallback_response();
        assert!(fallback.helplines.iter().any(|h| h.name == "AASRA"));
        assert!(fallback.render_text().contains("91-9820466726"));
    }
}
