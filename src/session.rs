//! # Query Session Module
//!
//! Query lifecycle state machine. A session moves from `Idle` to `Searching`
//! when a non-empty query is submitted, and to `Displayed` once scoring
//! completes. Every submission receives a fresh query identifier; feedback
//! and click records remain keyed to the identifier that was current when
//! they were written and are never rekeyed retroactively.

use crate::errors::{Result, SearchError};
use crate::QueryId;
use uuid::Uuid;

/// Lifecycle states of one search session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No query has been submitted
    Idle,
    /// A query was submitted and is being scored
    Searching,
    /// Results for the current query are available
    Displayed,
}

/// State machine tracking the current query and its identifier
#[derive(Debug, Clone)]
pub struct QuerySession {
    state: QueryState,
    query_id: Option<QueryId>,
    query_text: String,
}

impl QuerySession {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            state: QueryState::Idle,
            query_id: None,
            query_text: String::new(),
        }
    }

    /// Submit a query, entering `Searching` with a fresh identifier.
    ///
    /// Valid from any state: re-submitting while results are displayed
    /// starts a new search under a new identifier. Empty or whitespace-only
    /// queries are rejected and leave the session unchanged.
    pub fn submit(&mut self, query: &str) -> Result<QueryId> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidSearchQuery {
                query: query.to_string(),
                reason: "Query must not be empty".to_string(),
            });
        }

        let query_id = Uuid::new_v4();
        self.state = QueryState::Searching;
        self.query_id = Some(query_id);
        self.query_text = trimmed.to_string();
        tracing::debug!("Search submitted, query_id={}", query_id);
        Ok(query_id)
    }

    /// Mark scoring as complete, entering `Displayed`
    pub fn complete(&mut self) -> Result<()> {
        if self.state != QueryState::Searching {
            return Err(SearchError::InvalidSessionTransition {
                details: format!("Cannot complete from {:?}", self.state),
            });
        }
        self.state = QueryState::Displayed;
        Ok(())
    }

    /// Current state
    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Identifier of the current query, if one has been submitted
    pub fn query_id(&self) -> Option<QueryId> {
        self.query_id
    }

    /// Trimmed text of the current query
    pub fn query_text(&self) -> &str {
        &self.query_text
    }
}

impl Default for QuerySession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_enters_searching_with_fresh_id() {
        let mut session = QuerySession::new();
        assert_eq!(session.state(), QueryState::Idle);
        assert!(session.query_id().is_none());

        let id = session.submit("vadeli işlem").unwrap();
        assert_eq!(session.state(), QueryState::Searching);
        assert_eq!(session.query_id(), Some(id));
        assert_eq!(session.query_text(), "vadeli işlem");
    }

    #[test]
    fn test_complete_enters_displayed() {
        let mut session = QuerySession::new();
        session.submit("tazminat").unwrap();
        session.complete().unwrap();
        assert_eq!(session.state(), QueryState::Displayed);
    }

    #[test]
    fn test_resubmission_generates_new_id() {
        let mut session = QuerySession::new();
        let first = session.submit("tazminat").unwrap();
        session.complete().unwrap();

        let second = session.submit("faiz alacağı").unwrap();
        assert_ne!(first, second);
        assert_eq!(session.state(), QueryState::Searching);
    }

    #[test]
    fn test_empty_submission_rejected_and_state_unchanged() {
        let mut session = QuerySession::new();
        session.submit("tazminat").unwrap();
        session.complete().unwrap();
        let id = session.query_id();

        let err = session.submit("   ").unwrap_err();
        assert!(matches!(err, SearchError::InvalidSearchQuery { .. }));
        assert_eq!(session.state(), QueryState::Displayed);
        assert_eq!(session.query_id(), id);
    }

    #[test]
    fn test_complete_requires_searching() {
        let mut session = QuerySession::new();
        let err = session.complete().unwrap_err();
        assert!(matches!(err, SearchError::InvalidSessionTransition { .. }));
    }
}
