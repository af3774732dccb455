//! Canned demo scenarios recognised by the stub analyzers.

use crate::models::AnalyzerVerdict;

/// A precomputed verdict for one exact piece of content.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub content: &'static str,
    pub verdict: AnalyzerVerdict,
    pub confidence: u8,
    pub evidence: &'static [&'static str],
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        content: "Breaking: Scientists discover cure for diabetes using AI technology!",
        verdict: AnalyzerVerdict::False,
        confidence: 95,
        evidence: &[
            "No peer-reviewed publication supports this claim",
            "Major medical bodies report no such breakthrough",
            "Sensational headline pattern typical of misinformation",
        ],
    },
    Scenario {
        content: "Congratulations! You won $1M lottery. Send $500 processing fee to claim!",
        verdict: AnalyzerVerdict::Scam,
        confidence: 99,
        evidence: &[
            "Advance-fee request is a classic lottery scam pattern",
            "No lottery was entered by the recipient",
            "Urgency and unrealistic prize amount",
        ],
    },
    Scenario {
        content: "NASA announces new Mars mission scheduled for 2026",
        verdict: AnalyzerVerdict::True,
        confidence: 87,
        evidence: &[
            "Consistent with published agency mission planning",
            "Reported by multiple reputable outlets",
        ],
    },
    Scenario {
        content: "Your bank account has been suspended. Click here to verify: http://secure-bank-verify.com/login",
        verdict: AnalyzerVerdict::Malicious,
        confidence: 97,
        evidence: &[
            "Link domain impersonates a banking brand",
            "Credential harvesting page pattern",
            "Account suspension pretext",
        ],
    },
    Scenario {
        content: "This photo shows a shark swimming on a flooded highway after the hurricane",
        verdict: AnalyzerVerdict::Manipulated,
        confidence: 91,
        evidence: &[
            "Image recirculated from an unrelated event",
            "Compositing artifacts around the subject",
        ],
    },
];

/// Look up a canned scenario by exact, case-insensitive content.
pub fn find(content: &str) -> Option<&'static Scenario> {
    let needle = content.trim().to_lowercase();
    SCENARIOS
        .iter()
        .find(|scenario| scenario.content.to_lowercase() == needle)
}
