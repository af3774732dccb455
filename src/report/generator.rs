//! Verification report generation.
//!
//! Renders a verification outcome for the terminal (Markdown-flavoured
//! text) or as JSON for other front ends.

use crate::agent::AnalyzerDescriptor;
use crate::models::{AnalyzerResult, OverallResult, VerificationOutcome, VerificationSession};
use anyhow::Result;

/// Generate a complete text report for one verification.
pub fn generate_text_report(
    outcome: &VerificationOutcome,
    descriptors: &[AnalyzerDescriptor],
) -> String {
    let mut output = String::new();

    output.push_str(&generate_overall_section(&outcome.overall));
    output.push_str(&format!(
        "*Session: {} | Agents: {} | Completed in {}ms*\n\n",
        outcome.session_id,
        outcome.results.len(),
        outcome.elapsed_ms
    ));
    output.push_str(&generate_results_section(&outcome.results, descriptors));

    output
}

/// Generate the headline block.
fn generate_overall_section(overall: &OverallResult) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## {} {} ({}% confidence)\n\n",
        overall.verdict.emoji(),
        overall.verdict,
        overall.confidence
    ));
    section.push_str(&format!(
        "**Risk level:** {} {}\n\n",
        overall.risk_level.emoji(),
        overall.risk_level
    ));
    section.push_str(&overall.summary);
    section.push_str("\n\n");

    section
}

/// Generate the per-agent breakdown.
fn generate_results_section(results: &[AnalyzerResult], descriptors: &[AnalyzerDescriptor]) -> String {
    let mut section = String::new();

    section.push_str("### Agent Results\n\n");

    for result in results {
        section.push_str(&generate_result_block(result, descriptors));
    }

    section
}

/// Generate a single agent block.
fn generate_result_block(result: &AnalyzerResult, descriptors: &[AnalyzerDescriptor]) -> String {
    let mut block = String::new();

    let (icon, name) = descriptors
        .iter()
        .find(|d| d.id == result.analyzer_id)
        .map(|d| (d.icon.as_str(), d.display_name.as_str()))
        .unwrap_or(("🤖", result.analyzer_id.as_str()));

    block.push_str(&format!(
        "#### {} {} - **{}** ({}%)\n\n",
        icon, name, result.verdict, result.confidence
    ));

    for evidence in &result.evidence {
        block.push_str(&format!("- {}\n", evidence));
    }
    if !result.evidence.is_empty() {
        block.push('\n');
    }

    for recommendation in &result.recommendations {
        block.push_str(&format!("> 💡 {}\n", recommendation));
    }
    if !result.recommendations.is_empty() {
        block.push('\n');
    }

    block.push_str(&format!("*Processed in {}ms*\n\n", result.elapsed_ms));

    block
}

/// Generate a short status block for a stored session.
pub fn generate_session_summary(session: &VerificationSession) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("Session {} ({})\n", session.id, session.status));
    summary.push_str(&format!("  Requested by: {}\n", session.requester_id));
    summary.push_str(&format!(
        "  Created: {}\n",
        session.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if session.status.is_terminal() {
        if let Some(completed_at) = session.completed_at {
            summary.push_str(&format!(
                "  Finished: {}\n",
                completed_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    }
    if !session.selected_analyzers.is_empty() {
        summary.push_str(&format!(
            "  Agents: {}\n",
            session.selected_analyzers.join(", ")
        ));
    }
    if let Some(ref overall) = session.overall {
        summary.push_str(&format!(
            "  Verdict: {} {} ({}%, {} risk)\n",
            overall.verdict.emoji(),
            overall.verdict,
            overall.confidence,
            overall.risk_level
        ));
    }
    if let Some(ref error) = session.error {
        summary.push_str(&format!("  Error: {}\n", error));
    }

    summary
}

/// Generate a JSON report.
pub fn generate_json_report(outcome: &VerificationOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AnalyzerClass;
    use crate::analysis::aggregate;
    use crate::models::{AnalyzerVerdict, SessionStatus};
    use std::time::Duration;

    fn create_test_outcome() -> VerificationOutcome {
        let mut news = AnalyzerResult::new("news", AnalyzerVerdict::False, 95);
        news.evidence.push("No peer-reviewed publication".to_string());
        news.recommendations.push("Check sources".to_string());
        news.elapsed_ms = 1200;
        let unknown = AnalyzerResult::new("custom", AnalyzerVerdict::False, 95);

        let results = vec![news, unknown];
        VerificationOutcome {
            session_id: "s-1".to_string(),
            overall: aggregate(&results),
            results,
            elapsed_ms: 1210,
        }
    }

    fn descriptors() -> Vec<AnalyzerDescriptor> {
        vec![AnalyzerDescriptor {
            id: "news".to_string(),
            display_name: "News Verification Agent".to_string(),
            icon: "📰".to_string(),
            keywords: vec!["news".to_string()],
            latency: Duration::ZERO,
            class: AnalyzerClass::Content,
        }]
    }

    #[test]
    fn test_generate_text_report() {
        let report = generate_text_report(&create_test_outcome(), &descriptors());

        assert!(report.contains("## ❌ FALSE (95% confidence)"));
        assert!(report.contains("**Risk level:** 🟠 HIGH"));
        assert!(report.contains("2 AI agents found this content to be false"));
        assert!(report.contains("#### 📰 News Verification Agent - **FALSE** (95%)"));
        assert!(report.contains("- No peer-reviewed publication"));
        assert!(report.contains("> 💡 Check sources"));
        assert!(report.contains("*Session: s-1 | Agents: 2 | Completed in 1210ms*"));
    }

    #[test]
    fn test_unknown_agent_falls_back_to_id() {
        let report = generate_text_report(&create_test_outcome(), &descriptors());
        assert!(report.contains("#### 🤖 custom - **FALSE** (95%)"));
    }

    #[test]
    fn test_generate_session_summary() {
        let mut session = VerificationSession::new(
            "s-9".to_string(),
            "user-3".to_string(),
            "text".to_string(),
        );
        session.status = SessionStatus::Failed;
        session.error = Some("Analyzer 'scam' failed".to_string());

        let summary = generate_session_summary(&session);
        assert!(summary.starts_with("Session s-9 (failed)"));
        assert!(summary.contains("Requested by: user-3"));
        assert!(summary.contains("Error: Analyzer 'scam' failed"));
        assert!(!summary.contains("Verdict"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["session_id"], "s-1");
        assert_eq!(value["overall"]["verdict"], "FALSE");
        assert_eq!(value["overall"]["risk_level"], "HIGH");
        assert_eq!(value["results"][0]["analyzer_id"], "news");
    }
}
