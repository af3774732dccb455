//! In-memory verification session store.
//!
//! Sessions live in a map keyed by id behind an async `RwLock`. The store
//! enforces at most one live verification per id and forward-only status
//! transitions, and evicts sessions past the retention horizon.

use crate::error::{VerifyError, VerifyResult};
use crate::models::{SessionStatus, VerificationSession};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Session map plus the lifetime verification counter.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, VerificationSession>>,
    total: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending session and return its generation.
    ///
    /// Fails with `DuplicateSession` if a session with the same id is pending,
    /// running or completed. A failed session is replaced. Counts towards the
    /// lifetime total on success.
    pub async fn begin(&self, mut session: VerificationSession) -> VerifyResult<u64> {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.get(&session.id) {
            if existing.status.blocks_reuse() {
                return Err(VerifyError::DuplicateSession(session.id));
            }
            debug!("Replacing failed session {}", session.id);
        }

        let generation = self.total.fetch_add(1, Ordering::Relaxed) + 1;
        session.generation = generation;
        sessions.insert(session.id.clone(), session);
        Ok(generation)
    }

    /// Insert or overwrite a session without any checks.
    #[allow(dead_code)] // Raw write, used when seeding a store
    pub async fn put(&self, session: VerificationSession) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    /// Fetch a copy of a session.
    pub async fn get(&self, id: &str) -> VerifyResult<VerificationSession> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| VerifyError::NotFound(id.to_string()))
    }

    /// Move a session to `next` and apply `update` to it.
    ///
    /// Only the record registered with `generation` is touched: if the id was
    /// swept and registered again, the caller gets `NotFound`. Backward or
    /// skipping transitions fail with `InvalidTransition` and leave the
    /// session untouched.
    pub async fn advance<F>(
        &self,
        id: &str,
        generation: u64,
        next: SessionStatus,
        update: F,
    ) -> VerifyResult<()>
    where
        F: FnOnce(&mut VerificationSession),
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .filter(|s| s.generation == generation)
            .ok_or_else(|| VerifyError::NotFound(id.to_string()))?;

        if !session.status.can_transition_to(next) {
            warn!(
                "Refusing status change {} -> {} for session {}",
                session.status, next, id
            );
            return Err(VerifyError::InvalidTransition {
                session: id.to_string(),
                from: session.status,
                to: next,
            });
        }

        session.status = next;
        update(session);
        Ok(())
    }

    /// Remove sessions created before `now - horizon`, regardless of status.
    /// Returns the number removed.
    pub async fn sweep_expired_at(&self, now: DateTime<Utc>, horizon: chrono::Duration) -> usize {
        let cutoff = now - horizon;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.created_at >= cutoff);
        let removed = before - sessions.len();

        if removed > 0 {
            info!("Swept {} expired sessions", removed);
        }
        removed
    }

    /// Remove sessions older than `horizon` as of now.
    pub async fn sweep_expired(&self, horizon: chrono::Duration) -> usize {
        self.sweep_expired_at(Utc::now(), horizon).await
    }

    /// Number of sessions currently running.
    pub async fn active_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.status == SessionStatus::Running)
            .count()
    }

    /// Verifications accepted over the lifetime of the store.
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Run `sweep_expired` on a fixed interval until the task is aborted.
pub fn spawn_sweeper(
    store: Arc<SessionStore>,
    every: Duration,
    horizon: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired(horizon).await;
            debug!("Sweeper pass removed {} sessions", removed);
        }
    })
}
