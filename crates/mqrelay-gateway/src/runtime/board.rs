//! Session outcome board: surfaces MC auth results to waiting web sessions.

use dashmap::DashMap;

/// Result of an auth flow as reported by the MC side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: Option<String>,
}

/// Keyed by `sessionId`. One-shot: `take` consumes the outcome.
#[derive(Default)]
pub struct SessionBoard {
    outcomes: DashMap<String, AuthOutcome>,
}

impl SessionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, session_id: impl Into<String>, outcome: AuthOutcome) {
        self.outcomes.insert(session_id.into(), outcome);
    }

    pub fn take(&self, session_id: &str) -> Option<AuthOutcome> {
        self.outcomes.remove(session_id).map(|(_, v)| v)
    }

    pub fn peek(&self, session_id: &str) -> Option<AuthOutcome> {
        self.outcomes.get(session_id).map(|r| r.value().clone())
    }
}
