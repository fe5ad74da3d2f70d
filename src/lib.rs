//! # Decretum Search
//!
//! ## Overview
//! This library implements relevance-ranked search over Turkish court decision
//! records. Scoring is a deterministic, weighted multi-field lexical heuristic:
//! queries are tokenized, matched against the title, keywords, summary, and a
//! bounded full-text window of each decision, and mapped onto a 0-100 score
//! with a per-field breakdown.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `tokenizer`: Normalization, stop word filtering, and query tokenization
//! - `scorer`: Weighted multi-field relevance scoring with per-field breakdown
//! - `highlighter`: Term- and sentence-level match highlighting
//! - `session`: Query lifecycle state machine and query identifiers
//! - `storage`: Feedback and click-log persistence (in-memory and sled-backed)
//! - `export`: CSV/JSON export of collected relevance judgments
//! - `engine`: Corpus loading, ranking, and filtering
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Decision records (JSON), free-text search queries
//! - **Output**: Ranked results with score breakdowns and highlight segments
//! - **Scoring**: Pure and synchronous; identical inputs yield identical scores
//!
//! ## Usage
//! ```rust,no_run
//! use decretum_search::{Config, SearchEngine};
//! use std::path::Path;
//!
//! fn main() -> decretum_search::Result<()> {
//!     let config = Config::load()?;
//!     let mut engine = SearchEngine::new(config);
//!     engine.load_corpus(Path::new("data/decisions"))?;
//!     let outcome = engine.search("vadeli döviz işlemi")?;
//!     println!("Found {} results", outcome.results.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod tokenizer;
pub mod scorer;
pub mod highlighter;
pub mod session;
pub mod storage;
pub mod export;
pub mod engine;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, SearchError};
pub use engine::{SearchEngine, SearchFilters, SearchOutcome, SearchResult};
pub use highlighter::{Highlighter, TextSegment};
pub use scorer::{RelevanceBreakdown, RelevanceScorer};
pub use session::{QuerySession, QueryState};
pub use storage::{ClickEntry, FeedbackEntry, FeedbackStore, FeedbackValue};
pub use tokenizer::Tokenizer;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single search submission. Feedback and click
/// records are correlated to the submission that produced them through this
/// identifier and are never rekeyed when a new search is issued.
pub type QueryId = Uuid;

/// A single court decision record.
///
/// Immutable once loaded: relevance scores are computed per query and carried
/// on search results, never written back onto the record. The `date` field is
/// an ISO-8601 date string, so lexicographic comparison orders records
/// chronologically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Unique decision identifier
    pub id: String,
    /// Decision title
    pub title: String,
    /// Court that issued the decision
    pub court: String,
    /// Country of the issuing court
    #[serde(default)]
    pub country: String,
    /// Decision date (ISO-8601, e.g. "2023-05-17")
    pub date: String,
    /// Short summary of the decision
    #[serde(default)]
    pub summary: String,
    /// Editorial keywords, in their original order
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Full decision text
    #[serde(default)]
    pub full_text: String,
}
