//! The analyzer seam.
//!
//! An analyzer is anything that can look at a piece of content and return a
//! verdict. The orchestrator only depends on the [`Analyzer`] trait, so the
//! stub analyzers can be swapped for real ones without touching fan-out or
//! aggregation.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::models::AnalyzerResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Broad family an analyzer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerClass {
    /// Claims and reporting (news, fact)
    #[default]
    Content,
    /// Fraud and social engineering (scam)
    Fraud,
    /// Links and credential harvesting (phishing)
    Link,
    /// Images and video
    Media,
}

impl AnalyzerClass {
    /// Whether suspicious-phrase heuristics apply to this class.
    pub fn is_fraud_oriented(self) -> bool {
        matches!(self, AnalyzerClass::Fraud | AnalyzerClass::Link)
    }
}

/// Identity and dispatch metadata of an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerDescriptor {
    pub id: String,
    pub display_name: String,
    pub icon: String,
    /// Lower-cased trigger substrings.
    pub keywords: Vec<String>,
    pub latency: Duration,
    pub class: AnalyzerClass,
}

impl AnalyzerDescriptor {
    /// Whether any trigger keyword occurs in already lower-cased content.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && lowered.contains(k.as_str()))
    }
}

impl From<&AnalyzerConfig> for AnalyzerDescriptor {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            id: config.id.clone(),
            display_name: config.display_name.clone(),
            icon: config.icon.clone(),
            keywords: config
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            latency: Duration::from_millis(config.latency_ms),
            class: config.class,
        }
    }
}

/// Per-request information passed to every analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub session_id: String,
    pub requester_id: String,
}

/// A pluggable unit producing one verdict for a piece of content.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Static metadata describing this analyzer.
    fn descriptor(&self) -> &AnalyzerDescriptor;

    /// Analyzer id, shorthand for `descriptor().id`.
    fn id(&self) -> &str {
        &self.descriptor().id
    }

    /// Analyze the content and produce exactly one result.
    async fn analyze(
        &self,
        content: &str,
        ctx: &RequestContext,
    ) -> Result<AnalyzerResult, AnalyzerError>;
}
