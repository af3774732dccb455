//! Verification orchestrator.
//!
//! Drives one request end to end: register the session, select analyzers,
//! run them all concurrently, and either aggregate their results or fail the
//! whole session if any of them failed.

use crate::agent::{Analyzer, AnalyzerDescriptor, RequestContext};
use crate::analysis::{aggregate, AgentSelector, SelectionPolicy};
use crate::config::Config;
use crate::error::{AnalyzerError, VerifyError, VerifyResult};
use crate::models::{AnalyzerResult, SessionStatus, VerificationOutcome, VerificationSession};
use crate::session::SessionStore;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Coordinates analyzers, aggregation and session bookkeeping.
pub struct Orchestrator {
    analyzers: Vec<Arc<dyn Analyzer>>,
    selector: AgentSelector,
    store: Arc<SessionStore>,
    analyzer_timeout: Option<Duration>,
}

impl Orchestrator {
    /// Create an orchestrator over an analyzer registry and a session store.
    pub fn new(
        analyzers: Vec<Arc<dyn Analyzer>>,
        policy: SelectionPolicy,
        store: Arc<SessionStore>,
    ) -> Self {
        let descriptors: Vec<AnalyzerDescriptor> =
            analyzers.iter().map(|a| a.descriptor().clone()).collect();

        if analyzers.is_empty() {
            warn!("Orchestrator created without analyzers; every request will be rejected");
        }

        info!(
            "Initializing orchestrator with {} analyzers (max {} per request)",
            analyzers.len(),
            policy.max_analyzers
        );

        Self {
            selector: AgentSelector::new(descriptors, policy),
            analyzers,
            store,
            analyzer_timeout: None,
        }
    }

    /// Create an orchestrator using the orchestrator section of the config.
    pub fn from_config(
        config: &Config,
        analyzers: Vec<Arc<dyn Analyzer>>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self::new(analyzers, SelectionPolicy::from(&config.orchestrator), store)
            .with_timeout(config.orchestrator.analyzer_timeout_ms.map(Duration::from_millis))
    }

    /// Limit how long any single analyzer may run.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.analyzer_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn selector(&self) -> &AgentSelector {
        &self.selector
    }

    /// Verify a piece of content.
    ///
    /// Reuses `session_id` when given, otherwise generates one. Fails with
    /// `InvalidRequest` on blank content or an empty registry,
    /// `DuplicateSession` if the id is already live or completed, and
    /// `AnalyzerFailure` if any selected analyzer fails. If the session was
    /// swept while running, the call fails with `NotFound` and leaves any
    /// newer session with the same id alone. No partial result is produced on
    /// failure.
    pub async fn verify(
        &self,
        content: &str,
        requester_id: &str,
        session_id: Option<&str>,
    ) -> VerifyResult<VerificationOutcome> {
        if content.trim().is_empty() {
            return Err(VerifyError::InvalidRequest(
                "content must not be empty".to_string(),
            ));
        }

        if self.analyzers.is_empty() {
            return Err(VerifyError::InvalidRequest(
                "no analyzers are configured".to_string(),
            ));
        }

        let session_id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let generation = self
            .store
            .begin(VerificationSession::new(
                session_id.clone(),
                requester_id.to_string(),
                content.to_string(),
            ))
            .await?;

        let selected = self.selector.select(content);
        info!(
            "Session {}: running {} analyzers [{}]",
            session_id,
            selected.len(),
            selected.join(", ")
        );

        let recorded = selected.clone();
        self.store
            .advance(&session_id, generation, SessionStatus::Running, move |s| {
                s.selected_analyzers = recorded;
            })
            .await?;

        let ctx = RequestContext {
            session_id: session_id.clone(),
            requester_id: requester_id.to_string(),
        };

        let chosen: Vec<Arc<dyn Analyzer>> = selected
            .iter()
            .filter_map(|id| self.analyzers.iter().find(|a| a.id() == id).cloned())
            .collect();

        // Every future is created before any is awaited, so latencies overlap.
        let started = Instant::now();
        let settled = join_all(
            chosen
                .iter()
                .map(|analyzer| self.run_analyzer(&**analyzer, content, &ctx)),
        )
        .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let mut results = Vec::with_capacity(settled.len());
        for (analyzer, outcome) in chosen.iter().zip(settled) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    return Err(self
                        .fail_session(&session_id, generation, analyzer.id(), e)
                        .await)
                }
            }
        }

        let overall = aggregate(&results);
        info!(
            "Session {}: {} ({}% confidence, {} risk) in {}ms",
            session_id, overall.verdict, overall.confidence, overall.risk_level, elapsed_ms
        );

        let stored_results = results.clone();
        let stored_overall = overall.clone();
        self.store
            .advance(&session_id, generation, SessionStatus::Completed, move |s| {
                s.results = stored_results
                    .into_iter()
                    .map(|r| (r.analyzer_id.clone(), r))
                    .collect();
                s.overall = Some(stored_overall);
                s.completed_at = Some(Utc::now());
            })
            .await?;

        Ok(VerificationOutcome {
            session_id,
            overall,
            results,
            elapsed_ms,
        })
    }

    /// Run one analyzer, applying the timeout and stamping id and timing.
    async fn run_analyzer(
        &self,
        analyzer: &dyn Analyzer,
        content: &str,
        ctx: &RequestContext,
    ) -> Result<AnalyzerResult, AnalyzerError> {
        let started = Instant::now();
        let call = analyzer.analyze(content, ctx);

        let mut result = match self.analyzer_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AnalyzerError::Timeout(limit.as_millis() as u64))??,
            None => call.await?,
        };

        result.analyzer_id = analyzer.id().to_string();
        result.confidence = result.confidence.min(100);
        result.elapsed_ms = started.elapsed().as_millis() as u64;

        debug!(
            "Analyzer {} returned {} ({}%) in {}ms",
            result.analyzer_id, result.verdict, result.confidence, result.elapsed_ms
        );
        Ok(result)
    }

    /// Mark the session failed and build the error for the caller.
    async fn fail_session(
        &self,
        session_id: &str,
        generation: u64,
        analyzer_id: &str,
        error: AnalyzerError,
    ) -> VerifyError {
        warn!(
            "Session {}: analyzer {} failed: {}",
            session_id, analyzer_id, error
        );

        let failure = VerifyError::AnalyzerFailure {
            analyzer: analyzer_id.to_string(),
            message: error.to_string(),
        };

        let message = failure.to_string();
        if let Err(e) = self
            .store
            .advance(session_id, generation, SessionStatus::Failed, move |s| {
                s.error = Some(message);
                s.completed_at = Some(Utc::now());
            })
            .await
        {
            warn!("Could not record failure for session {}: {}", session_id, e);
        }

        failure
    }

    /// Number of verifications currently running.
    pub async fn active_count(&self) -> usize {
        self.store.active_count().await
    }

    /// Verifications accepted since start.
    pub fn total_count(&self) -> u64 {
        self.store.total_count()
    }

    /// Look up a session for detail rendering.
    pub async fn session(&self, id: &str) -> VerifyResult<VerificationSession> {
        self.store.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{build_registry, AnalyzerClass};
    use crate::models::{AnalyzerVerdict, OverallVerdict, RiskLevel};
    use async_trait::async_trait;
    use tokio_test::assert_ok;

    /// Analyzer returning a fixed verdict after a fixed delay, or failing.
    struct FixedAnalyzer {
        descriptor: AnalyzerDescriptor,
        verdict: AnalyzerVerdict,
        confidence: u32,
        fail: bool,
    }

    impl FixedAnalyzer {
        fn new(id: &str, latency_ms: u64, verdict: AnalyzerVerdict, confidence: u32) -> Self {
            Self {
                descriptor: AnalyzerDescriptor {
                    id: id.to_string(),
                    display_name: id.to_string(),
                    icon: String::new(),
                    keywords: vec![id.to_string()],
                    latency: Duration::from_millis(latency_ms),
                    class: AnalyzerClass::Content,
                },
                verdict,
                confidence,
                fail: false,
            }
        }

        fn failing(id: &str, latency_ms: u64) -> Self {
            Self {
                fail: true,
                ..Self::new(id, latency_ms, AnalyzerVerdict::Unverified, 0)
            }
        }
    }

    #[async_trait]
    impl Analyzer for FixedAnalyzer {
        fn descriptor(&self) -> &AnalyzerDescriptor {
            &self.descriptor
        }

        async fn analyze(
            &self,
            _content: &str,
            _ctx: &RequestContext,
        ) -> Result<AnalyzerResult, AnalyzerError> {
            tokio::time::sleep(self.descriptor.latency).await;
            if self.fail {
                return Err(AnalyzerError::Failed("backend unavailable".to_string()));
            }
            Ok(AnalyzerResult::new(
                "ignored",
                self.verdict,
                self.confidence,
            ))
        }
    }

    fn default_orchestrator() -> Orchestrator {
        let config = Config::default();
        Orchestrator::from_config(&config, build_registry(&config), Arc::new(SessionStore::new()))
    }

    fn fixed_orchestrator(analyzers: Vec<FixedAnalyzer>) -> Orchestrator {
        let analyzers = analyzers
            .into_iter()
            .map(|a| Arc::new(a) as Arc<dyn Analyzer>)
            .collect();
        Orchestrator::new(
            analyzers,
            SelectionPolicy {
                max_analyzers: 4,
                default_analyzers: vec!["alpha".to_string()],
            },
            Arc::new(SessionStore::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_false_claim_scenario() {
        let orchestrator = default_orchestrator();
        let outcome = orchestrator
            .verify(
                "Breaking: Scientists discover cure for diabetes using AI technology!",
                "user-1",
                None,
            )
            .await
            .unwrap();

        let ids: Vec<_> = outcome.results.iter().map(|r| r.analyzer_id.as_str()).collect();
        assert_eq!(ids, vec!["news", "fact"]);
        assert!(outcome
            .results
            .iter()
            .all(|r| r.verdict == AnalyzerVerdict::False && r.confidence == 95));
        assert_eq!(outcome.overall.verdict, OverallVerdict::False);
        assert_eq!(outcome.overall.confidence, 95);
        assert_eq!(outcome.overall.risk_level, RiskLevel::High);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lottery_scam_scenario() {
        let orchestrator = default_orchestrator();
        let outcome = orchestrator
            .verify(
                "Congratulations! You won $1M lottery. Send $500 processing fee to claim!",
                "user-1",
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].analyzer_id, "scam");
        assert_eq!(outcome.results[0].verdict, AnalyzerVerdict::Scam);
        assert_eq!(outcome.overall.verdict, OverallVerdict::Dangerous);
        assert_eq!(outcome.overall.confidence, 99);
        assert_eq!(outcome.overall.risk_level, RiskLevel::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn test_true_news_scenario() {
        let orchestrator = default_orchestrator();
        let outcome = orchestrator
            .verify("NASA announces new Mars mission scheduled for 2026", "user-1", None)
            .await
            .unwrap();

        let ids: Vec<_> = outcome.results.iter().map(|r| r.analyzer_id.as_str()).collect();
        assert_eq!(ids, vec!["news", "fact"]);
        assert_eq!(outcome.overall.verdict, OverallVerdict::Verified);
        assert_eq!(outcome.overall.confidence, 87);
        assert_eq!(outcome.overall.risk_level, RiskLevel::Minimal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_session_is_recorded() {
        let orchestrator = default_orchestrator();
        let outcome = orchestrator
            .verify("NASA announces new Mars mission scheduled for 2026", "user-7", Some("s-42"))
            .await
            .unwrap();
        assert_eq!(outcome.session_id, "s-42");

        let session = orchestrator.session("s-42").await.unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.requester_id, "user-7");
        assert_eq!(session.selected_analyzers, vec!["news", "fact"]);
        let mut keys: Vec<_> = session.results.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["fact", "news"]);
        assert_eq!(session.overall, Some(outcome.overall));
        assert!(session.completed_at.is_some());
        assert_eq!(orchestrator.total_count(), 1);
        assert_eq!(orchestrator.active_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyzers_run_concurrently() {
        let orchestrator = fixed_orchestrator(vec![
            FixedAnalyzer::new("alpha", 100, AnalyzerVerdict::Unverified, 60),
            FixedAnalyzer::new("beta", 200, AnalyzerVerdict::Unverified, 60),
            FixedAnalyzer::new("gamma", 300, AnalyzerVerdict::Unverified, 60),
            FixedAnalyzer::new("delta", 400, AnalyzerVerdict::Unverified, 60),
        ]);

        let started = Instant::now();
        let outcome = orchestrator
            .verify("alpha beta gamma delta", "user", None)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(outcome.results.len(), 4);
        let sum = Duration::from_millis(100 + 200 + 300 + 400);
        assert!(elapsed >= Duration::from_millis(400));
        assert!(elapsed < sum / 2, "took {:?}", elapsed);
        assert!(outcome.elapsed_ms < 500);

        for (result, latency) in outcome.results.iter().zip([100, 200, 300, 400]) {
            assert!(
                (latency..latency + 5).contains(&result.elapsed_ms),
                "{} took {}ms",
                result.analyzer_id,
                result.elapsed_ms
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_session_is_rejected() {
        let orchestrator = fixed_orchestrator(vec![FixedAnalyzer::new(
            "alpha",
            500,
            AnalyzerVerdict::True,
            90,
        )]);

        let (first, second) = tokio::join!(
            orchestrator.verify("alpha", "user", Some("same")),
            orchestrator.verify("alpha again", "user", Some("same")),
        );

        assert_ok!(first);
        assert_eq!(
            second.unwrap_err(),
            VerifyError::DuplicateSession("same".to_string())
        );

        // Completed ids cannot be rerun either.
        let third = orchestrator.verify("alpha", "user", Some("same")).await;
        assert!(matches!(third, Err(VerifyError::DuplicateSession(_))));
        assert_eq!(orchestrator.total_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_count_while_running() {
        let orchestrator = fixed_orchestrator(vec![FixedAnalyzer::new(
            "alpha",
            1000,
            AnalyzerVerdict::True,
            90,
        )]);

        let probe = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            orchestrator.active_count().await
        };
        let (outcome, active) = tokio::join!(orchestrator.verify("alpha", "user", None), probe);

        assert_ok!(outcome);
        assert_eq!(active, 1);
        assert_eq!(orchestrator.active_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyzer_failure_fails_whole_session() {
        let orchestrator = fixed_orchestrator(vec![
            FixedAnalyzer::new("alpha", 50, AnalyzerVerdict::True, 95),
            FixedAnalyzer::failing("beta", 10),
        ]);

        let err = orchestrator
            .verify("alpha beta", "user", Some("broken"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            VerifyError::AnalyzerFailure {
                analyzer: "beta".to_string(),
                message: "analysis failed: backend unavailable".to_string(),
            }
        );

        let session = orchestrator.session("broken").await.unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
        assert!(session.overall.is_none());
        assert!(session.results.is_empty());
        assert!(session.error.unwrap().contains("backend unavailable"));

        // A failed id may be retried.
        let retry = orchestrator.verify("alpha", "user", Some("broken")).await;
        assert_ok!(retry);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyzer_timeout_fails_session() {
        let orchestrator = fixed_orchestrator(vec![
            FixedAnalyzer::new("alpha", 50, AnalyzerVerdict::True, 95),
            FixedAnalyzer::new("beta", 10_000, AnalyzerVerdict::True, 95),
        ])
        .with_timeout(Some(Duration::from_millis(200)));

        let err = orchestrator
            .verify("alpha beta", "user", Some("slow"))
            .await
            .unwrap_err();
        match err {
            VerifyError::AnalyzerFailure { analyzer, message } => {
                assert_eq!(analyzer, "beta");
                assert_eq!(message, "timed out after 200ms");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            orchestrator.session("slow").await.unwrap().status,
            SessionStatus::Failed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_swept_session_is_not_overwritten_by_stale_run() {
        let orchestrator = fixed_orchestrator(vec![
            FixedAnalyzer::new("alpha", 500, AnalyzerVerdict::True, 90),
            FixedAnalyzer::new("beta", 500, AnalyzerVerdict::Scam, 99),
        ]);
        let store = orchestrator.store().clone();

        let rerun = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store
                .sweep_expired_at(Utc::now() + chrono::Duration::hours(2), chrono::Duration::hours(1))
                .await;
            orchestrator.verify("alpha", "u2", Some("x")).await
        };
        let (first, second) = tokio::join!(orchestrator.verify("beta", "u1", Some("x")), rerun);

        assert_eq!(first.unwrap_err(), VerifyError::NotFound("x".to_string()));
        let second = second.unwrap();
        assert_eq!(second.overall.verdict, OverallVerdict::Verified);

        let session = orchestrator.session("x").await.unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.content, "alpha");
        assert_eq!(session.requester_id, "u2");
        assert_eq!(session.overall, Some(second.overall));
        assert_eq!(orchestrator.total_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_registry_is_rejected() {
        let orchestrator = fixed_orchestrator(Vec::new());
        let err = orchestrator.verify("hello", "user", Some("e")).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidRequest(_)));
        assert_eq!(orchestrator.total_count(), 0);
        assert!(orchestrator.session("e").await.is_err());
    }

    #[tokio::test]
    async fn test_blank_content_is_invalid() {
        let orchestrator = default_orchestrator();
        let err = orchestrator.verify("   ", "user", Some("x")).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidRequest(_)));
        assert_eq!(orchestrator.total_count(), 0);
        assert_eq!(
            orchestrator.session("x").await.unwrap_err(),
            VerifyError::NotFound("x".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_generated_session_ids_are_unique() {
        let orchestrator = default_orchestrator();
        let a = orchestrator.verify("hello", "user", None).await.unwrap();
        let b = orchestrator.verify("hello", "user", None).await.unwrap();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(orchestrator.total_count(), 2);
    }
}
