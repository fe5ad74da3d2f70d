//! # Feedback Storage Module
//!
//! ## Purpose
//! Persistent storage for relevance judgments and result-click records,
//! keyed by (query id, decision id) with last-write-wins semantics.
//!
//! ## Input/Output Specification
//! - **Input**: Feedback entries, click entries
//! - **Output**: Stored collections for inspection and export
//! - **Storage**: In-memory store for ephemeral sessions and tests; sled
//!   embedded database for persistence
//!
//! ## Key Features
//! - Store abstraction injected into callers; scoring never touches storage
//! - At most one feedback entry per (query id, decision id) pair, last write
//!   wins
//! - Duplicate clicks on the same pair within one hour are collapsed
//! - Undecodable persisted values are treated as absent, not as failures

use crate::errors::Result;
use crate::scorer::RelevanceBreakdown;
use crate::{Decision, QueryId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Window within which repeat clicks on the same pair are collapsed
const CLICK_DEDUP_WINDOW_MS: i64 = 3_600_000;

/// Binary relevance judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackValue {
    Relevant,
    NotRelevant,
}

impl std::fmt::Display for FeedbackValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackValue::Relevant => write!(f, "relevant"),
            FeedbackValue::NotRelevant => write!(f, "not_relevant"),
        }
    }
}

impl std::str::FromStr for FeedbackValue {
    type Err = crate::SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relevant" => Ok(FeedbackValue::Relevant),
            "not_relevant" => Ok(FeedbackValue::NotRelevant),
            other => Err(crate::SearchError::ValidationFailed {
                field: "feedback value".to_string(),
                reason: format!("Expected 'relevant' or 'not_relevant', got '{}'", other),
            }),
        }
    }
}

/// One relevance judgment, with a snapshot of the score and matched terms
/// at judgment time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    /// Identifier of the search submission being judged
    pub query_id: String,
    /// Identifier of the judged decision
    pub decision_id: String,
    /// The judgment
    pub value: FeedbackValue,
    /// Judgment time, epoch milliseconds
    pub timestamp: i64,
    /// Query text at judgment time
    pub query_text: String,
    /// Decision title at judgment time
    pub decision_title: String,
    /// Issuing court
    pub court: String,
    /// Decision date
    pub date: String,
    /// Total relevance score shown to the user when judging
    pub score_at_time: u32,
    /// Matched terms shown to the user when judging
    pub matched_terms: Vec<String>,
}

impl FeedbackEntry {
    /// Build an entry from the scored decision the judgment refers to,
    /// timestamped now
    pub fn from_judgment(
        query_id: QueryId,
        query_text: &str,
        decision: &Decision,
        breakdown: &RelevanceBreakdown,
        value: FeedbackValue,
    ) -> Self {
        Self {
            query_id: query_id.to_string(),
            decision_id: decision.id.clone(),
            value,
            timestamp: chrono::Utc::now().timestamp_millis(),
            query_text: query_text.to_string(),
            decision_title: decision.title.clone(),
            court: decision.court.clone(),
            date: decision.date.clone(),
            score_at_time: breakdown.total_score,
            matched_terms: breakdown.matched_terms.clone(),
        }
    }
}

/// One result-click record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEntry {
    pub query_id: String,
    pub decision_id: String,
    /// Click time, epoch milliseconds
    pub timestamp: i64,
}

/// Injected key-value store for feedback and click records
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Save a judgment, replacing any prior entry for the same
    /// (query id, decision id) pair
    async fn save_feedback(&self, entry: FeedbackEntry) -> Result<()>;

    /// Fetch the judgment for a pair, if any
    async fn get_feedback(&self, query_id: &str, decision_id: &str)
        -> Result<Option<FeedbackEntry>>;

    /// All stored judgments
    async fn all_feedback(&self) -> Result<Vec<FeedbackEntry>>;

    /// Record a result click, collapsing repeats on the same pair within
    /// the one-hour window
    async fn log_click(&self, entry: ClickEntry) -> Result<()>;

    /// All stored clicks
    async fn all_clicks(&self) -> Result<Vec<ClickEntry>>;
}

/// In-memory store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryFeedbackStore {
    feedback: Arc<RwLock<HashMap<(String, String), FeedbackEntry>>>,
    clicks: Arc<RwLock<Vec<ClickEntry>>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn save_feedback(&self, entry: FeedbackEntry) -> Result<()> {
        let key = (entry.query_id.clone(), entry.decision_id.clone());
        self.feedback.write().await.insert(key, entry);
        Ok(())
    }

    async fn get_feedback(
        &self,
        query_id: &str,
        decision_id: &str,
    ) -> Result<Option<FeedbackEntry>> {
        let key = (query_id.to_string(), decision_id.to_string());
        Ok(self.feedback.read().await.get(&key).cloned())
    }

    async fn all_feedback(&self) -> Result<Vec<FeedbackEntry>> {
        let mut entries: Vec<FeedbackEntry> = self.feedback.read().await.values().cloned().collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn log_click(&self, entry: ClickEntry) -> Result<()> {
        let mut clicks = self.clicks.write().await;
        clicks.retain(|existing| {
            !(existing.query_id == entry.query_id
                && existing.decision_id == entry.decision_id
                && entry.timestamp - existing.timestamp < CLICK_DEDUP_WINDOW_MS)
        });
        clicks.push(entry);
        Ok(())
    }

    async fn all_clicks(&self) -> Result<Vec<ClickEntry>> {
        Ok(self.clicks.read().await.clone())
    }
}

/// Sled-backed persistent store
pub struct SledFeedbackStore {
    db: sled::Db,
    feedback: sled::Tree,
    clicks: sled::Tree,
}

impl SledFeedbackStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = sled::open(path)?;
        let feedback = db.open_tree("feedback")?;
        let clicks = db.open_tree("clicks")?;

        tracing::info!(
            "Feedback store opened at {:?} with {} judgments",
            path,
            feedback.len()
        );

        Ok(Self {
            db,
            feedback,
            clicks,
        })
    }

    fn pair_key(query_id: &str, decision_id: &str) -> String {
        format!("{}:{}", query_id, decision_id)
    }
}

#[async_trait]
impl FeedbackStore for SledFeedbackStore {
    async fn save_feedback(&self, entry: FeedbackEntry) -> Result<()> {
        let key = Self::pair_key(&entry.query_id, &entry.decision_id);
        let value = bincode::serialize(&entry)?;
        self.feedback.insert(key.as_bytes(), value)?;
        self.db.flush_async().await?;
        tracing::debug!(
            "Stored {} judgment for decision {}",
            entry.value,
            entry.decision_id
        );
        Ok(())
    }

    async fn get_feedback(
        &self,
        query_id: &str,
        decision_id: &str,
    ) -> Result<Option<FeedbackEntry>> {
        let key = Self::pair_key(query_id, decision_id);
        match self.feedback.get(key.as_bytes())? {
            Some(bytes) => match bincode::deserialize(&bytes) {
                Ok(entry) => Ok(Some(entry)),
                Err(e) => {
                    // Unparseable stored data counts as absent.
                    tracing::warn!("Dropping undecodable feedback entry {}: {}", key, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn all_feedback(&self) -> Result<Vec<FeedbackEntry>> {
        let mut entries = Vec::new();
        for item in self.feedback.iter() {
            let (key, bytes) = item?;
            match bincode::deserialize::<FeedbackEntry>(&bytes) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(
                        "Dropping undecodable feedback entry {}: {}",
                        String::from_utf8_lossy(&key),
                        e
                    );
                }
            }
        }
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn log_click(&self, entry: ClickEntry) -> Result<()> {
        // Clicks are keyed by pair and timestamp so repeats outside the
        // dedup window are all retained.
        let prefix = format!("{}:{}:", entry.query_id, entry.decision_id);
        for item in self.clicks.scan_prefix(prefix.as_bytes()) {
            let (key, bytes) = item?;
            let Ok(existing) = bincode::deserialize::<ClickEntry>(&bytes) else {
                self.clicks.remove(&key)?;
                continue;
            };
            if entry.timestamp - existing.timestamp < CLICK_DEDUP_WINDOW_MS {
                self.clicks.remove(&key)?;
            }
        }

        let key = format!("{}{:020}", prefix, entry.timestamp.max(0));
        let value = bincode::serialize(&entry)?;
        self.clicks.insert(key.as_bytes(), value)?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn all_clicks(&self) -> Result<Vec<ClickEntry>> {
        let mut entries = Vec::new();
        for item in self.clicks.iter() {
            let (_, bytes) = item?;
            if let Ok(entry) = bincode::deserialize::<ClickEntry>(&bytes) {
                entries.push(entry);
            }
        }
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(query_id: &str, decision_id: &str, value: FeedbackValue, ts: i64) -> FeedbackEntry {
        FeedbackEntry {
            query_id: query_id.to_string(),
            decision_id: decision_id.to_string(),
            value,
            timestamp: ts,
            query_text: "vadeli işlem".to_string(),
            decision_title: "Vadeli döviz alım-satım future işlemi".to_string(),
            court: "Yargıtay 11. Hukuk Dairesi".to_string(),
            date: "2022-03-14".to_string(),
            score_at_time: 68,
            matched_terms: vec!["vadeli".to_string(), "işlem".to_string()],
        }
    }

    #[tokio::test]
    async fn test_memory_last_write_wins() {
        let store = MemoryFeedbackStore::new();
        store
            .save_feedback(entry("q1", "d1", FeedbackValue::Relevant, 1))
            .await
            .unwrap();
        store
            .save_feedback(entry("q1", "d1", FeedbackValue::NotRelevant, 2))
            .await
            .unwrap();

        let all = store.all_feedback().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, FeedbackValue::NotRelevant);

        let fetched = store.get_feedback("q1", "d1").await.unwrap().unwrap();
        assert_eq!(fetched.value, FeedbackValue::NotRelevant);
    }

    #[tokio::test]
    async fn test_memory_distinct_pairs_kept() {
        let store = MemoryFeedbackStore::new();
        store
            .save_feedback(entry("q1", "d1", FeedbackValue::Relevant, 1))
            .await
            .unwrap();
        store
            .save_feedback(entry("q1", "d2", FeedbackValue::Relevant, 2))
            .await
            .unwrap();
        store
            .save_feedback(entry("q2", "d1", FeedbackValue::NotRelevant, 3))
            .await
            .unwrap();
        assert_eq!(store.all_feedback().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_memory_click_dedup_within_window() {
        let store = MemoryFeedbackStore::new();
        let click = |ts| ClickEntry {
            query_id: "q1".to_string(),
            decision_id: "d1".to_string(),
            timestamp: ts,
        };

        store.log_click(click(1_000)).await.unwrap();
        store.log_click(click(2_000)).await.unwrap();
        let clicks = store.all_clicks().await.unwrap();
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].timestamp, 2_000);

        // A click beyond the window is a separate record.
        store
            .log_click(click(2_000 + CLICK_DEDUP_WINDOW_MS))
            .await
            .unwrap();
        assert_eq!(store.all_clicks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sled_last_write_wins_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.db");
        {
            let store = SledFeedbackStore::open(&path).unwrap();
            store
                .save_feedback(entry("q1", "d1", FeedbackValue::Relevant, 1))
                .await
                .unwrap();
            store
                .save_feedback(entry("q1", "d1", FeedbackValue::NotRelevant, 2))
                .await
                .unwrap();
        }

        let store = SledFeedbackStore::open(&path).unwrap();
        let all = store.all_feedback().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, FeedbackValue::NotRelevant);
    }

    #[tokio::test]
    async fn test_sled_malformed_entries_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.db");
        {
            let db = sled::open(&path).unwrap();
            let tree = db.open_tree("feedback").unwrap();
            tree.insert(b"q1:d1", b"not bincode at all".as_slice())
                .unwrap();
            db.flush().unwrap();
        }

        let store = SledFeedbackStore::open(&path).unwrap();
        assert!(store.get_feedback("q1", "d1").await.unwrap().is_none());
        assert!(store.all_feedback().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sled_click_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.db");
        let store = SledFeedbackStore::open(&path).unwrap();
        let click = |ts| ClickEntry {
            query_id: "q1".to_string(),
            decision_id: "d1".to_string(),
            timestamp: ts,
        };

        store.log_click(click(10_000)).await.unwrap();
        store.log_click(click(20_000)).await.unwrap();
        store
            .log_click(click(20_000 + CLICK_DEDUP_WINDOW_MS))
            .await
            .unwrap();

        let clicks = store.all_clicks().await.unwrap();
        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0].timestamp, 20_000);
    }
}
