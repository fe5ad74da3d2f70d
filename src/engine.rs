//! # Search Engine Module
//!
//! ## Purpose
//! Ties the tokenizer, scorer, highlighter, and query session together over
//! a loaded decision corpus: every decision is scored against the query,
//! zero-score results are dropped, and the rest are ranked by total score.
//!
//! ## Input/Output Specification
//! - **Input**: Search queries (text), optional court/date/score filters
//! - **Output**: Ranked results with score breakdowns, highlight segments
//! - **Corpus**: Decision records loaded from JSON files in a directory
//!
//! ## Key Features
//! - Deterministic ranking: total score descending, then date descending,
//!   then identifier
//! - Query length validation against configured bounds
//! - Malformed corpus files are skipped with a warning, not fatal

use crate::config::Config;
use crate::errors::{Result, SearchError};
use crate::highlighter::{Highlighter, TextSegment};
use crate::scorer::{RelevanceBreakdown, RelevanceScorer};
use crate::session::QuerySession;
use crate::{Decision, QueryId};
use std::path::Path;

/// One scored decision in a result list
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub decision: Decision,
    pub breakdown: RelevanceBreakdown,
}

/// Results of one search submission
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Identifier of this submission, for correlating feedback and clicks
    pub query_id: QueryId,
    /// Ranked results, best first
    pub results: Vec<SearchResult>,
}

/// Data-level result filters
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Keep only decisions from this court
    pub court: Option<String>,
    /// Keep only decisions dated on or after this ISO date
    pub date_from: Option<String>,
    /// Keep only decisions dated on or before this ISO date
    pub date_to: Option<String>,
    /// Keep only results with at least this total score
    pub min_score: Option<u32>,
}

/// Main search engine
pub struct SearchEngine {
    config: Config,
    scorer: RelevanceScorer,
    highlighter: Highlighter,
    session: QuerySession,
    decisions: Vec<Decision>,
}

impl SearchEngine {
    /// Create an engine with an empty corpus
    pub fn new(config: Config) -> Self {
        let scorer = RelevanceScorer::new(config.scoring.clone());
        let highlighter = Highlighter::new(config.highlighting.max_highlights);
        Self {
            config,
            scorer,
            highlighter,
            session: QuerySession::new(),
            decisions: Vec::new(),
        }
    }

    /// Create an engine over the given decisions
    pub fn with_decisions(config: Config, decisions: Vec<Decision>) -> Self {
        let mut engine = Self::new(config);
        engine.decisions = decisions;
        engine
    }

    /// Load decision records from JSON files in a directory.
    ///
    /// Each `.json` file may hold either a single decision or an array of
    /// decisions. Files that fail to parse are skipped with a warning so a
    /// single bad record cannot take down the whole corpus. Returns the
    /// number of decisions loaded.
    pub fn load_corpus(&mut self, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            match parse_decisions(&content) {
                Ok(mut decisions) => {
                    loaded += decisions.len();
                    self.decisions.append(&mut decisions);
                }
                Err(e) => {
                    tracing::warn!("Skipping unparseable corpus file {:?}: {}", path, e);
                }
            }
        }
        tracing::info!("Loaded {} decisions from {:?}", loaded, dir);
        Ok(loaded)
    }

    /// Search the corpus
    pub fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        self.search_filtered(query, &SearchFilters::default())
    }

    /// Search the corpus with data-level filters applied before ranking
    pub fn search_filtered(
        &mut self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<SearchOutcome> {
        self.validate_query(query)?;
        let query_id = self.session.submit(query)?;

        let mut results: Vec<SearchResult> = self
            .decisions
            .iter()
            .filter(|d| matches_filters(d, filters))
            .map(|d| SearchResult {
                decision: d.clone(),
                breakdown: self.scorer.score(query, d),
            })
            .filter(|r| r.breakdown.total_score > 0)
            .filter(|r| {
                filters
                    .min_score
                    .map_or(true, |min| r.breakdown.total_score >= min)
            })
            .collect();

        // Deterministic order: score, then newest, then identifier.
        results.sort_by(|a, b| {
            b.breakdown
                .total_score
                .cmp(&a.breakdown.total_score)
                .then_with(|| b.decision.date.cmp(&a.decision.date))
                .then_with(|| a.decision.id.cmp(&b.decision.id))
        });
        results.truncate(self.config.search.max_results);

        self.session.complete()?;
        tracing::debug!(
            "Query {} matched {} decisions",
            query_id,
            results.len()
        );

        Ok(SearchOutcome { query_id, results })
    }

    /// Term-highlighted segments for a short display text such as a summary
    pub fn highlight_summary(&self, text: &str, query: &str) -> Vec<TextSegment> {
        let tokens = self.scorer.tokenize_query(query);
        self.highlighter.highlight_terms(text, &tokens)
    }

    /// Sentence-highlighted segments for full-document display
    pub fn highlight_full_text(&self, text: &str, query: &str) -> Vec<TextSegment> {
        let tokens = self.scorer.tokenize_query(query);
        self.highlighter.highlight_sentences(text, &tokens)
    }

    /// Find a decision by identifier
    pub fn decision(&self, id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.id == id)
    }

    /// Loaded corpus
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Current query session
    pub fn session(&self) -> &QuerySession {
        &self.session
    }

    /// The engine's scorer
    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    fn validate_query(&self, query: &str) -> Result<()> {
        let length = query.trim().chars().count();
        if length < self.config.search.min_query_length {
            return Err(SearchError::InvalidSearchQuery {
                query: query.to_string(),
                reason: format!(
                    "Query too short: minimum {} characters",
                    self.config.search.min_query_length
                ),
            });
        }
        if length > self.config.search.max_query_length {
            return Err(SearchError::InvalidSearchQuery {
                query: query.to_string(),
                reason: format!(
                    "Query too long: maximum {} characters",
                    self.config.search.max_query_length
                ),
            });
        }
        Ok(())
    }
}

fn matches_filters(decision: &Decision, filters: &SearchFilters) -> bool {
    if let Some(court) = &filters.court {
        if &decision.court != court {
            return false;
        }
    }
    // ISO date strings compare lexicographically.
    if let Some(from) = &filters.date_from {
        if &decision.date < from {
            return false;
        }
    }
    if let Some(to) = &filters.date_to {
        if &decision.date > to {
            return false;
        }
    }
    true
}

fn parse_decisions(content: &str) -> serde_json::Result<Vec<Decision>> {
    match serde_json::from_str::<Vec<Decision>>(content) {
        Ok(decisions) => Ok(decisions),
        Err(_) => serde_json::from_str::<Decision>(content).map(|d| vec![d]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QueryState;
    use std::io::Write;

    fn decision(id: &str, title: &str, date: &str, court: &str) -> Decision {
        Decision {
            id: id.to_string(),
            title: title.to_string(),
            court: court.to_string(),
            country: "TR".to_string(),
            date: date.to_string(),
            summary: String::new(),
            keywords: Vec::new(),
            full_text: String::new(),
        }
    }

    fn corpus() -> Vec<Decision> {
        vec![
            decision(
                "d1",
                "Vadeli döviz alım-satım future işlemi",
                "2022-03-14",
                "Yargıtay 11. Hukuk Dairesi",
            ),
            decision(
                "d2",
                "Kira sözleşmesinin feshi ve tahliye",
                "2021-06-02",
                "Yargıtay 3. Hukuk Dairesi",
            ),
            decision(
                "d3",
                "Vadeli mevduat faizi uyuşmazlığı",
                "2023-01-20",
                "Yargıtay 11. Hukuk Dairesi",
            ),
        ]
    }

    #[test]
    fn test_results_ranked_by_score() {
        let mut engine = SearchEngine::with_decisions(Config::default(), corpus());
        let outcome = engine.search("vadeli döviz").unwrap();
        assert_eq!(outcome.results.len(), 2);
        // d1 matches both tokens, d3 only one.
        assert_eq!(outcome.results[0].decision.id, "d1");
        assert_eq!(outcome.results[1].decision.id, "d3");
        assert!(
            outcome.results[0].breakdown.total_score
                > outcome.results[1].breakdown.total_score
        );
        assert_eq!(engine.session().state(), QueryState::Displayed);
    }

    #[test]
    fn test_zero_score_results_dropped() {
        let mut engine = SearchEngine::with_decisions(Config::default(), corpus());
        let outcome = engine.search("bambaşka konu").unwrap();
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_each_search_gets_new_query_id() {
        let mut engine = SearchEngine::with_decisions(Config::default(), corpus());
        let first = engine.search("vadeli").unwrap();
        let second = engine.search("vadeli").unwrap();
        assert_ne!(first.query_id, second.query_id);
    }

    #[test]
    fn test_empty_query_rejected() {
        let mut engine = SearchEngine::with_decisions(Config::default(), corpus());
        assert!(engine.search("   ").is_err());
        assert_eq!(engine.session().state(), QueryState::Idle);
    }

    #[test]
    fn test_court_filter() {
        let mut engine = SearchEngine::with_decisions(Config::default(), corpus());
        let filters = SearchFilters {
            court: Some("Yargıtay 11. Hukuk Dairesi".to_string()),
            ..Default::default()
        };
        let outcome = engine.search_filtered("vadeli sözleşme", &filters).unwrap();
        assert!(outcome
            .results
            .iter()
            .all(|r| r.decision.court == "Yargıtay 11. Hukuk Dairesi"));
    }

    #[test]
    fn test_date_range_filter() {
        let mut engine = SearchEngine::with_decisions(Config::default(), corpus());
        let filters = SearchFilters {
            date_from: Some("2022-01-01".to_string()),
            date_to: Some("2022-12-31".to_string()),
            ..Default::default()
        };
        let outcome = engine.search_filtered("vadeli", &filters).unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].decision.id, "d1");
    }

    #[test]
    fn test_min_score_filter() {
        let mut engine = SearchEngine::with_decisions(Config::default(), corpus());
        let filters = SearchFilters {
            min_score: Some(80),
            ..Default::default()
        };
        let outcome = engine.search_filtered("vadeli", &filters).unwrap();
        assert!(outcome
            .results
            .iter()
            .all(|r| r.breakdown.total_score >= 80));
    }

    #[test]
    fn test_load_corpus_skips_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = serde_json::json!([
            {
                "id": "d1",
                "title": "Vadeli işlem",
                "court": "Yargıtay",
                "date": "2022-03-14",
                "summary": "",
                "keywords": [],
                "fullText": ""
            }
        ]);
        std::fs::write(dir.path().join("good.json"), good.to_string()).unwrap();
        let mut bad = std::fs::File::create(dir.path().join("bad.json")).unwrap();
        bad.write_all(b"{ this is not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut engine = SearchEngine::new(Config::default());
        let loaded = engine.load_corpus(dir.path()).unwrap();
        assert_eq!(loaded, 1);
        assert!(engine.decision("d1").is_some());
    }

    #[test]
    fn test_single_decision_file_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let single = serde_json::json!({
            "id": "d9",
            "title": "Tek karar",
            "court": "Yargıtay",
            "date": "2020-01-01"
        });
        std::fs::write(dir.path().join("one.json"), single.to_string()).unwrap();

        let mut engine = SearchEngine::new(Config::default());
        assert_eq!(engine.load_corpus(dir.path()).unwrap(), 1);
    }

    #[test]
    fn test_highlighting_through_engine() {
        let engine = SearchEngine::with_decisions(Config::default(), corpus());
        let segments =
            engine.highlight_summary("Vadeli işlem sözleşmesi feshedildi", "vadeli ve işlem");
        let text: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, "Vadeli işlem sözleşmesi feshedildi");
        assert!(segments.iter().any(|s| s.highlighted));
    }
}
