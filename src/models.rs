//! Data models for the verification core.
//!
//! This module contains the verdict enums, per-analyzer results, the
//! aggregated overall result and the session record that tracks one
//! verification request from submission to completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Verdict label produced by a single analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyzerVerdict {
    /// Content checks out against known sources
    Verified,
    /// Claim is true
    True,
    /// Claim is false or fabricated
    False,
    /// Link or payload is actively harmful
    Malicious,
    /// Content is a fraud attempt
    Scam,
    /// Content shows warning signs
    Suspicious,
    /// Nothing conclusive could be determined
    Unverified,
    /// Media appears unaltered
    Authentic,
    /// Media appears edited or synthetic
    Manipulated,
}

impl fmt::Display for AnalyzerVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerVerdict::Verified => write!(f, "VERIFIED"),
            AnalyzerVerdict::True => write!(f, "TRUE"),
            AnalyzerVerdict::False => write!(f, "FALSE"),
            AnalyzerVerdict::Malicious => write!(f, "MALICIOUS"),
            AnalyzerVerdict::Scam => write!(f, "SCAM"),
            AnalyzerVerdict::Suspicious => write!(f, "SUSPICIOUS"),
            AnalyzerVerdict::Unverified => write!(f, "UNVERIFIED"),
            AnalyzerVerdict::Authentic => write!(f, "AUTHENTIC"),
            AnalyzerVerdict::Manipulated => write!(f, "MANIPULATED"),
        }
    }
}

/// Result of one analyzer for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResult {
    /// Id of the analyzer that produced this result.
    pub analyzer_id: String,
    /// Verdict label.
    pub verdict: AnalyzerVerdict,
    /// Confidence in the verdict, 0-100 inclusive.
    pub confidence: u8,
    /// Supporting evidence, in the order it was gathered.
    pub evidence: Vec<String>,
    /// Suggested actions for the reader.
    pub recommendations: Vec<String>,
    /// Wall-clock time spent in the analyzer, in milliseconds.
    pub elapsed_ms: u64,
}

impl AnalyzerResult {
    /// Creates a result, clamping confidence into 0-100.
    pub fn new(analyzer_id: impl Into<String>, verdict: AnalyzerVerdict, confidence: u32) -> Self {
        Self {
            analyzer_id: analyzer_id.into(),
            verdict,
            confidence: confidence.min(100) as u8,
            evidence: Vec::new(),
            recommendations: Vec::new(),
            elapsed_ms: 0,
        }
    }
}

/// Aggregated verdict over all analyzers of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallVerdict {
    Verified,
    Dangerous,
    False,
    Suspicious,
    Unverified,
}

impl fmt::Display for OverallVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallVerdict::Verified => write!(f, "VERIFIED"),
            OverallVerdict::Dangerous => write!(f, "DANGEROUS"),
            OverallVerdict::False => write!(f, "FALSE"),
            OverallVerdict::Suspicious => write!(f, "SUSPICIOUS"),
            OverallVerdict::Unverified => write!(f, "UNVERIFIED"),
        }
    }
}

impl OverallVerdict {
    /// Returns an emoji representation of the verdict.
    pub fn emoji(&self) -> &'static str {
        match self {
            OverallVerdict::Verified => "✅",
            OverallVerdict::Dangerous => "🚨",
            OverallVerdict::False => "❌",
            OverallVerdict::Suspicious => "⚠️",
            OverallVerdict::Unverified => "❓",
        }
    }
}

/// Risk level attached to an overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "MINIMAL"),
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl RiskLevel {
    /// Returns an emoji representation of the risk level.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "🟢",
            RiskLevel::Low => "🔵",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🟠",
            RiskLevel::Critical => "🔴",
        }
    }
}

/// The folded result of every analyzer that ran for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallResult {
    pub verdict: OverallVerdict,
    /// Rounded mean of the analyzer confidences.
    pub confidence: u8,
    pub risk_level: RiskLevel,
    pub summary: String,
}

/// Lifecycle state of a verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "pending"),
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl SessionStatus {
    /// Whether moving from `self` to `next` is a legal forward transition.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Pending, SessionStatus::Running)
                | (SessionStatus::Running, SessionStatus::Completed)
                | (SessionStatus::Running, SessionStatus::Failed)
        )
    }

    /// Whether the session has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    /// Whether a new verification may reuse a session id in this state.
    pub fn blocks_reuse(self) -> bool {
        !matches!(self, SessionStatus::Failed)
    }
}

/// One user-submitted verification request and its evolving state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSession {
    pub id: String,
    pub requester_id: String,
    pub content: String,
    /// Analyzer ids chosen by the selector, in declaration order.
    pub selected_analyzers: Vec<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Populated only once the session has completed.
    pub results: HashMap<String, AnalyzerResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallResult>,
    /// Failure message, set only when the session failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Assigned by the store when the session is registered. A verification
    /// only writes to the record carrying the generation it was given.
    #[serde(skip)]
    pub generation: u64,
}

impl VerificationSession {
    /// Creates a pending session created now.
    pub fn new(id: String, requester_id: String, content: String) -> Self {
        Self::new_at(id, requester_id, content, Utc::now())
    }

    /// Creates a pending session with an explicit creation time.
    pub fn new_at(
        id: String,
        requester_id: String,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            requester_id,
            content,
            selected_analyzers: Vec::new(),
            status: SessionStatus::Pending,
            created_at,
            completed_at: None,
            results: HashMap::new(),
            overall: None,
            error: None,
            generation: 0,
        }
    }
}

/// What the orchestrator hands back to the caller for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub session_id: String,
    pub overall: OverallResult,
    /// Per-analyzer results in selection order.
    pub results: Vec<AnalyzerResult>,
    /// Total wall-clock time of the fan-out, in milliseconds.
    pub elapsed_ms: u64,
}
