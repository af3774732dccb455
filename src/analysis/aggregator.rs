//! Verdict aggregation.
//!
//! Folds the results of every analyzer that ran for a session into a single
//! verdict, confidence, risk level and summary. Everything here is pure.

use crate::models::{AnalyzerResult, AnalyzerVerdict, OverallResult, OverallVerdict, RiskLevel};

/// Mean confidence above which affirmative verdicts count as verified.
pub const VERIFIED_CONFIDENCE_THRESHOLD: f64 = 80.0;

/// Confidence above which a FALSE verdict is high risk.
pub const FALSE_HIGH_RISK_THRESHOLD: u8 = 90;

/// Aggregate analyzer results into an overall result.
///
/// An empty slice yields UNVERIFIED with zero confidence; the orchestrator
/// never calls this without at least one result.
pub fn aggregate(results: &[AnalyzerResult]) -> OverallResult {
    let mean = mean_confidence(results);
    let verdict = derive_verdict(results, mean);
    let confidence = round_confidence(mean);
    let risk_level = risk_level(verdict, confidence);

    OverallResult {
        verdict,
        confidence,
        risk_level,
        summary: summary_text(verdict, results.len()),
    }
}

/// Arithmetic mean of the analyzer confidences.
pub fn mean_confidence(results: &[AnalyzerResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: u32 = results.iter().map(|r| u32::from(r.confidence)).sum();
    f64::from(total) / results.len() as f64
}

fn round_confidence(mean: f64) -> u8 {
    mean.round().clamp(0.0, 100.0) as u8
}

/// Apply the verdict precedence rules; the first matching rule wins.
pub fn derive_verdict(results: &[AnalyzerResult], mean: f64) -> OverallVerdict {
    if any_of(results, &[AnalyzerVerdict::Malicious, AnalyzerVerdict::Scam]) {
        OverallVerdict::Dangerous
    } else if any_of(results, &[AnalyzerVerdict::False]) {
        OverallVerdict::False
    } else if any_of(results, &[AnalyzerVerdict::True, AnalyzerVerdict::Verified])
        && mean > VERIFIED_CONFIDENCE_THRESHOLD
    {
        OverallVerdict::Verified
    } else if any_of(results, &[AnalyzerVerdict::Suspicious, AnalyzerVerdict::Manipulated]) {
        OverallVerdict::Suspicious
    } else {
        OverallVerdict::Unverified
    }
}

fn any_of(results: &[AnalyzerResult], wanted: &[AnalyzerVerdict]) -> bool {
    results.iter().any(|r| wanted.contains(&r.verdict))
}

/// Risk level as a function of verdict and rounded confidence.
pub fn risk_level(verdict: OverallVerdict, confidence: u8) -> RiskLevel {
    match verdict {
        OverallVerdict::Dangerous => RiskLevel::Critical,
        OverallVerdict::False if confidence > FALSE_HIGH_RISK_THRESHOLD => RiskLevel::High,
        OverallVerdict::Suspicious => RiskLevel::Medium,
        OverallVerdict::Unverified => RiskLevel::Low,
        _ => RiskLevel::Minimal,
    }
}

/// Short human-readable sentence for the verdict.
pub fn summary_text(verdict: OverallVerdict, analyzer_count: usize) -> String {
    let agents = if analyzer_count == 1 {
        "1 AI agent".to_string()
    } else {
        format!("{} AI agents", analyzer_count)
    };

    match verdict {
        OverallVerdict::Dangerous => format!(
            "DANGER: {} flagged this content as a scam or malicious. Do not engage.",
            agents
        ),
        OverallVerdict::False => format!(
            "{} found this content to be false or misleading.",
            agents
        ),
        OverallVerdict::Verified => format!(
            "{} verified this content as accurate.",
            agents
        ),
        OverallVerdict::Suspicious => format!(
            "{} found suspicious elements. Proceed with caution.",
            agents
        ),
        OverallVerdict::Unverified => format!(
            "{} could not verify this content. Seek additional sources.",
            agents
        ),
    }
}
