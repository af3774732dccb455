//! Error types for the verification core.

use crate::models::SessionStatus;

/// Result type for orchestrator operations
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Errors surfaced to callers of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Verification already in progress or completed for session {0}")]
    DuplicateSession(String),

    #[error("Analyzer '{analyzer}' failed: {message}")]
    AnalyzerFailure { analyzer: String, message: String },

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session {session} cannot move from {from} to {to}")]
    InvalidTransition {
        session: String,
        from: SessionStatus,
        to: SessionStatus,
    },
}

impl VerifyError {
    /// Message a front end shows to the end user for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            VerifyError::InvalidRequest(_) => "Please provide some text to verify.",
            VerifyError::DuplicateSession(_) => {
                "This request is already in progress. Please wait for the result."
            }
            VerifyError::AnalyzerFailure { .. } => {
                "Verification failed. Please try again in a moment."
            }
            VerifyError::NotFound(_) => "That verification could not be found.",
            VerifyError::InvalidTransition { .. } => {
                "This verification can no longer be updated. Please submit it again."
            }
        }
    }
}

/// Errors raised by an individual analyzer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzerError {
    #[error("analysis failed: {0}")]
    Failed(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VerifyError::AnalyzerFailure {
            analyzer: "scam".to_string(),
            message: AnalyzerError::Timeout(500).to_string(),
        };
        assert_eq!(err.to_string(), "Analyzer 'scam' failed: timed out after 500ms");
        assert_eq!(
            VerifyError::NotFound("abc".to_string()).to_string(),
            "Session not found: abc"
        );
        let refused = VerifyError::InvalidTransition {
            session: "abc".to_string(),
            from: SessionStatus::Completed,
            to: SessionStatus::Running,
        };
        assert_eq!(
            refused.to_string(),
            "Session abc cannot move from completed to running"
        );
    }

    #[test]
    fn test_user_messages_differ_per_kind() {
        let duplicate = VerifyError::DuplicateSession("s".to_string()).user_message();
        let invalid = VerifyError::InvalidRequest("empty".to_string()).user_message();
        assert!(duplicate.contains("already in progress"));
        assert_ne!(duplicate, invalid);
    }
}
