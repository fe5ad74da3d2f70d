//! # Relevance Scoring Module
//!
//! ## Purpose
//! Weighted multi-field lexical relevance scoring of decisions against
//! free-text queries, producing a 0-100 total score with a per-field
//! breakdown and the matched query terms.
//!
//! ## Input/Output Specification
//! - **Input**: Query string, decision record, scoring weights
//! - **Output**: `RelevanceBreakdown` with per-field scores and term lists
//! - **Determinism**: Pure and synchronous; no shared state between calls
//!
//! ## Scoring Model
//! Each field score is the fraction of distinct query tokens matched in the
//! field, scaled by the field weight (title 40, keywords 35, summary 20,
//! full text 5 by default). Title, keyword, and summary tokens match by
//! bidirectional substring containment, which cheaply handles Turkish
//! agglutination ("tazminat" matches "tazminatı"). Full text matches by
//! exact token equality over a bounded leading window. The containment rule
//! intentionally over-matches short substrings; it must not be replaced with
//! real stemming, which would change score outputs.

use crate::config::ScoringConfig;
use crate::tokenizer::Tokenizer;
use crate::Decision;
use serde::{Deserialize, Serialize};

/// Per-field relevance breakdown for one query/decision pair.
///
/// Each field score is an integer in `[0, weight]`; `total_score` is an
/// integer in `[0, 100]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceBreakdown {
    /// Score contributed by keyword matches
    pub keyword_score: u32,
    /// Score contributed by title matches
    pub title_score: u32,
    /// Score contributed by summary matches
    pub summary_score: u32,
    /// Score contributed by full-text matches
    pub full_text_score: u32,
    /// Total relevance score, 0-100
    pub total_score: u32,
    /// Distinct query tokens that matched in any field, in first-seen order
    pub matched_terms: Vec<String>,
    /// Up to five matched tokens ordered by match multiplicity across
    /// fields, ties broken by first-seen order
    pub top_terms: Vec<String>,
}

/// Relevance scorer over decision records
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    tokenizer: Tokenizer,
    config: ScoringConfig,
}

impl RelevanceScorer {
    /// Create a scorer from scoring configuration
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(config.min_token_length),
            config,
        }
    }

    /// Tokenize a query with this scorer's tokenizer
    pub fn tokenize_query(&self, query: &str) -> Vec<String> {
        self.tokenizer.tokenize_query(query)
    }

    /// Access the underlying tokenizer
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Score a decision against a query.
    ///
    /// A query with no usable tokens yields an all-zero breakdown.
    pub fn score(&self, query: &str, decision: &Decision) -> RelevanceBreakdown {
        let query_tokens = self.tokenizer.tokenize_query(query);
        if query_tokens.is_empty() {
            return RelevanceBreakdown::default();
        }
        let total_tokens = query_tokens.len() as f64;

        let title_tokens = self.tokenizer.field_tokens(&decision.title);
        let title_matches = containment_matches(&query_tokens, &title_tokens);

        let keyword_text = decision.keywords.join(" ");
        let keyword_tokens = self.tokenizer.field_tokens(&keyword_text);
        let keyword_matches = containment_matches(&query_tokens, &keyword_tokens);

        let summary_tokens = self.tokenizer.field_tokens(&decision.summary);
        let summary_matches = containment_matches(&query_tokens, &summary_tokens);

        // Full text is capped to a leading window and matched exactly,
        // keeping the cost of scoring long decisions bounded.
        let full_text_window: String = decision
            .full_text
            .chars()
            .take(self.config.full_text_window)
            .collect();
        let full_text_tokens = self.tokenizer.field_tokens(&full_text_window);
        let full_text_matches: Vec<String> = query_tokens
            .iter()
            .filter(|qt| full_text_tokens.iter().any(|ft| ft == *qt))
            .cloned()
            .collect();

        let title_score =
            title_matches.len() as f64 / total_tokens * f64::from(self.config.title_weight);
        let keyword_score =
            keyword_matches.len() as f64 / total_tokens * f64::from(self.config.keyword_weight);
        let summary_score =
            summary_matches.len() as f64 / total_tokens * f64::from(self.config.summary_weight);
        let full_text_score = full_text_matches.len() as f64 / total_tokens
            * f64::from(self.config.full_text_weight);

        let max_possible = f64::from(
            self.config.title_weight
                + self.config.keyword_weight
                + self.config.summary_weight
                + self.config.full_text_weight,
        );
        let total_score = ((title_score + keyword_score + summary_score + full_text_score)
            / max_possible
            * 100.0)
            .round() as u32;

        // Matched terms: union across fields, first-seen order.
        let all_matches = title_matches
            .iter()
            .chain(keyword_matches.iter())
            .chain(summary_matches.iter())
            .chain(full_text_matches.iter());
        let mut matched_terms: Vec<String> = Vec::new();
        // Frequency over the concatenated per-field match lists: a token
        // matching in two fields counts twice.
        let mut term_frequency: Vec<(String, usize)> = Vec::new();
        for term in all_matches {
            if !matched_terms.contains(term) {
                matched_terms.push(term.clone());
            }
            match term_frequency.iter_mut().find(|(t, _)| t == term) {
                Some(entry) => entry.1 += 1,
                None => term_frequency.push((term.clone(), 1)),
            }
        }

        // Stable sort keeps first-seen order among equal frequencies.
        term_frequency.sort_by(|a, b| b.1.cmp(&a.1));
        let top_terms = term_frequency
            .into_iter()
            .take(self.config.top_terms_limit)
            .map(|(term, _)| term)
            .collect();

        RelevanceBreakdown {
            keyword_score: keyword_score.round() as u32,
            title_score: title_score.round() as u32,
            summary_score: summary_score.round() as u32,
            full_text_score: full_text_score.round() as u32,
            total_score,
            matched_terms,
            top_terms,
        }
    }
}

/// Query tokens with at least one bidirectional-containment match among the
/// field tokens: `q` matches `f` iff `f` contains `q` or `q` contains `f`.
fn containment_matches(query_tokens: &[String], field_tokens: &[String]) -> Vec<String> {
    query_tokens
        .iter()
        .filter(|qt| {
            field_tokens
                .iter()
                .any(|ft| ft.contains(qt.as_str()) || qt.contains(ft.as_str()))
        })
        .cloned()
        .collect()
}
