//! Keyword and lookup-table analyzers used for demos.
//!
//! A stub waits for its configured latency, then answers from the canned
//! scenario table or, failing that, from a small phrase heuristic. Heuristic
//! confidences come from a seeded hash bucket rather than a random source, so
//! the same seed, analyzer and content always give the same number.

use crate::agent::analyzer::{Analyzer, AnalyzerClass, AnalyzerDescriptor, RequestContext};
use crate::agent::scenarios;
use crate::config::Config;
use crate::error::AnalyzerError;
use crate::models::{AnalyzerResult, AnalyzerVerdict};
use async_trait::async_trait;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Phrases that push fraud- and link-oriented analyzers towards SUSPICIOUS.
pub const SUSPICIOUS_PHRASES: &[&str] = &[
    "urgent",
    "act now",
    "limited time",
    "click here",
    "verify your account",
    "send money",
    "wire transfer",
    "gift card",
    "password",
    "guaranteed",
];

const SUSPICIOUS_RANGE: Range<u32> = 85..95;
const UNVERIFIED_RANGE: Range<u32> = 50..80;

/// Stub analyzer driven entirely by its descriptor.
#[derive(Debug, Clone)]
pub struct StubAnalyzer {
    descriptor: AnalyzerDescriptor,
    seed: u64,
}

impl StubAnalyzer {
    pub fn new(descriptor: AnalyzerDescriptor, seed: u64) -> Self {
        Self { descriptor, seed }
    }

    /// Answer without the simulated delay.
    pub fn evaluate(&self, content: &str) -> AnalyzerResult {
        if let Some(scenario) = scenarios::find(content) {
            let mut result = AnalyzerResult::new(
                &self.descriptor.id,
                scenario.verdict,
                u32::from(scenario.confidence),
            );
            result.evidence = scenario.evidence.iter().map(|e| e.to_string()).collect();
            result
                .evidence
                .push(format!("{}: {}", self.descriptor.display_name, self.class_note()));
            result.recommendations.push(self.class_recommendation().to_string());
            return result;
        }

        let lowered = content.to_lowercase();
        let phrase = SUSPICIOUS_PHRASES
            .iter()
            .find(|phrase| lowered.contains(*phrase));

        match phrase {
            Some(phrase) if self.descriptor.class.is_fraud_oriented() => {
                let mut result = AnalyzerResult::new(
                    &self.descriptor.id,
                    AnalyzerVerdict::Suspicious,
                    self.bucket(content, SUSPICIOUS_RANGE),
                );
                result
                    .evidence
                    .push(format!("Contains suspicious phrase: '{}'", phrase));
                result
                    .evidence
                    .push(format!("{}: {}", self.descriptor.display_name, self.class_note()));
                result.recommendations.push(self.class_recommendation().to_string());
                result
            }
            _ => {
                let mut result = AnalyzerResult::new(
                    &self.descriptor.id,
                    AnalyzerVerdict::Unverified,
                    self.bucket(content, UNVERIFIED_RANGE),
                );
                result
                    .evidence
                    .push("No matching records found in reference sources".to_string());
                result
                    .recommendations
                    .push("Treat with caution until confirmed elsewhere".to_string());
                result
            }
        }
    }

    /// Deterministic value in `range` from FNV-1a over seed, id and content.
    fn bucket(&self, content: &str, range: Range<u32>) -> u32 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let bytes = self
            .seed
            .to_le_bytes()
            .into_iter()
            .chain(self.descriptor.id.bytes())
            .chain(content.bytes());
        for byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        let span = u64::from(range.end - range.start);
        range.start + (hash % span) as u32
    }

    fn class_note(&self) -> &'static str {
        match self.descriptor.class {
            AnalyzerClass::Content => "claim compared against reference reporting",
            AnalyzerClass::Fraud => "message matched known fraud patterns",
            AnalyzerClass::Link => "links and sender checked for impersonation",
            AnalyzerClass::Media => "media checked for reuse and editing traces",
        }
    }

    fn class_recommendation(&self) -> &'static str {
        match self.descriptor.class {
            AnalyzerClass::Content => "Cross-check with at least two independent reputable sources",
            AnalyzerClass::Fraud => "Do not send money or personal details",
            AnalyzerClass::Link => "Do not click links or enter credentials",
            AnalyzerClass::Media => "Run a reverse image or video search before sharing",
        }
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    fn descriptor(&self) -> &AnalyzerDescriptor {
        &self.descriptor
    }

    async fn analyze(
        &self,
        content: &str,
        ctx: &RequestContext,
    ) -> Result<AnalyzerResult, AnalyzerError> {
        debug!(
            "{} {} analyzing for session {} (requester {})",
            self.descriptor.icon, self.descriptor.id, ctx.session_id, ctx.requester_id
        );

        if !self.descriptor.latency.is_zero() {
            tokio::time::sleep(self.descriptor.latency).await;
        }

        Ok(self.evaluate(content))
    }
}

/// Build the stub registry described by the configuration, in declaration order.
pub fn build_registry(config: &Config) -> Vec<Arc<dyn Analyzer>> {
    config
        .analyzers
        .iter()
        .map(|a| {
            Arc::new(StubAnalyzer::new(AnalyzerDescriptor::from(a), config.stub.seed))
                as Arc<dyn Analyzer>
        })
        .collect()
}
