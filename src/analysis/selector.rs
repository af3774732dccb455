//! Agent selection.
//!
//! Maps raw content to the analyzers that should look at it. Selection never
//! fails: content matching nothing falls back to the default analyzers.

use crate::agent::{AnalyzerClass, AnalyzerDescriptor};
use crate::config::OrchestratorConfig;
use regex::Regex;

/// Limits and fallbacks applied on top of keyword matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Upper bound on the number of analyzers selected.
    pub max_analyzers: usize,
    /// Ids used when nothing matched.
    pub default_analyzers: Vec<String>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from(&OrchestratorConfig::default())
    }
}

impl From<&OrchestratorConfig> for SelectionPolicy {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            max_analyzers: config.max_analyzers.max(1),
            default_analyzers: config.default_analyzers.clone(),
        }
    }
}

/// Chooses analyzers for a piece of content.
#[derive(Debug, Clone)]
pub struct AgentSelector {
    descriptors: Vec<AnalyzerDescriptor>,
    policy: SelectionPolicy,
    url_pattern: Regex,
}

impl AgentSelector {
    /// Create a selector over descriptors in declaration order.
    pub fn new(descriptors: Vec<AnalyzerDescriptor>, policy: SelectionPolicy) -> Self {
        Self {
            descriptors,
            policy,
            url_pattern: Regex::new(r"(?i)https?://").expect("URL pattern is valid"),
        }
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> &[AnalyzerDescriptor] {
        &self.descriptors
    }

    /// Whether the content contains an `http://` or `https://` scheme
    /// anywhere, even glued to a preceding word or with nothing after it.
    pub fn contains_url(&self, content: &str) -> bool {
        self.url_pattern.is_match(content)
    }

    /// Select analyzer ids for the content.
    ///
    /// The result is non-empty whenever at least one analyzer is configured,
    /// free of duplicates, in declaration order, and no longer than
    /// `max_analyzers`. Link-class analyzers forced in by a URL are kept
    /// ahead of keyword matches when the cap applies.
    pub fn select(&self, content: &str) -> Vec<String> {
        let lowered = content.to_lowercase();
        let has_url = self.contains_url(content);

        let forced: Vec<bool> = self
            .descriptors
            .iter()
            .map(|d| has_url && d.class == AnalyzerClass::Link)
            .collect();
        let matched: Vec<bool> = self
            .descriptors
            .iter()
            .zip(&forced)
            .map(|(d, forced)| *forced || d.matches(&lowered))
            .collect();

        let mut chosen: Vec<usize> = (0..self.descriptors.len()).filter(|&i| matched[i]).collect();

        if chosen.is_empty() {
            chosen = self.fallback();
        }

        if chosen.len() > self.policy.max_analyzers {
            chosen = self.truncate(chosen, &forced);
        }

        chosen
            .into_iter()
            .map(|i| self.descriptors[i].id.clone())
            .collect()
    }

    /// Indices of the default analyzers, or the first analyzer if none of
    /// them is configured.
    fn fallback(&self) -> Vec<usize> {
        let defaults: Vec<usize> = self
            .descriptors
            .iter()
            .enumerate()
            .filter(|(_, d)| self.policy.default_analyzers.contains(&d.id))
            .map(|(i, _)| i)
            .collect();

        if defaults.is_empty() && !self.descriptors.is_empty() {
            vec![0]
        } else {
            defaults
        }
    }

    /// Keep forced analyzers first, fill the remaining slots in declaration
    /// order, and return indices sorted back into declaration order.
    fn truncate(&self, chosen: Vec<usize>, forced: &[bool]) -> Vec<usize> {
        let max = self.policy.max_analyzers;
        let (pinned, rest): (Vec<usize>, Vec<usize>) =
            chosen.into_iter().partition(|&i| forced[i]);

        let mut kept: Vec<usize> = pinned.into_iter().chain(rest).take(max).collect();
        kept.sort_unstable();
        kept
    }
}
