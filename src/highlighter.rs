//! # Highlighting Module
//!
//! ## Purpose
//! Locates query term matches in display text and produces renderable
//! segment sequences, at two granularities: individual whole-word term
//! matches and whole sentences containing any query keyword.
//!
//! ## Input/Output Specification
//! - **Input**: Display text, query token list, highlight cap
//! - **Output**: Ordered `TextSegment` sequence covering the input exactly
//! - **Round trip**: Concatenating all segment texts reproduces the input
//!
//! ## Key Features
//! - Whole-word, case-insensitive matching with regex-escaped tokens
//! - Configurable highlight cap to bound rendering cost on long text
//! - Overlapping and touching match spans merged into single segments
//! - Sentence-granularity mode with per-line fallback for unpunctuated text

use regex::{Regex, RegexBuilder};

/// One run of display text, either plain or highlighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    /// The covered text, exactly as it appears in the input
    pub text: String,
    /// Whether this run is a match to be emphasized
    pub highlighted: bool,
}

impl TextSegment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlighted: false,
        }
    }

    fn highlighted(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlighted: true,
        }
    }
}

/// Term and sentence highlighter
#[derive(Debug, Clone)]
pub struct Highlighter {
    max_highlights: usize,
}

impl Highlighter {
    /// Create a highlighter with the given per-text highlight cap
    pub fn new(max_highlights: usize) -> Self {
        Self { max_highlights }
    }

    /// Highlight whole-word occurrences of any token in the text.
    ///
    /// Matches are collected per token in order, capped at the configured
    /// limit, sorted by position, and merged when they overlap or touch.
    /// An empty token list returns the text unchanged as one plain segment.
    pub fn highlight_terms(&self, text: &str, tokens: &[String]) -> Vec<TextSegment> {
        if tokens.is_empty() || text.is_empty() {
            return vec![TextSegment::plain(text)];
        }

        let mut spans: Vec<(usize, usize)> = Vec::new();
        'tokens: for token in tokens {
            let Some(pattern) = word_pattern(&[token.clone()]) else {
                continue;
            };
            for m in pattern.find_iter(text) {
                if spans.len() >= self.max_highlights {
                    break 'tokens;
                }
                spans.push((m.start(), m.end()));
            }
        }

        spans.sort_by_key(|span| span.0);

        // Merge overlapping or touching spans into one.
        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in spans {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        let mut segments = Vec::new();
        let mut cursor = 0;
        for (start, end) in merged {
            if start > cursor {
                segments.push(TextSegment::plain(&text[cursor..start]));
            }
            segments.push(TextSegment::highlighted(&text[start..end]));
            cursor = end;
        }
        if cursor < text.len() {
            segments.push(TextSegment::plain(&text[cursor..]));
        }
        if segments.is_empty() {
            segments.push(TextSegment::plain(text));
        }
        segments
    }

    /// Highlight whole sentences containing any of the tokens.
    ///
    /// Text is split on runs of sentence-ending punctuation with the
    /// delimiter retained; a sentence is highlighted when any token occurs
    /// whole-word and case-insensitively within it. Text without sentence
    /// boundaries falls back to per-line marking. Concatenating the
    /// returned segments reproduces the input exactly.
    pub fn highlight_sentences(&self, text: &str, tokens: &[String]) -> Vec<TextSegment> {
        if tokens.is_empty() || text.is_empty() {
            return vec![TextSegment::plain(text)];
        }
        let Some(keyword_pattern) = word_pattern(tokens) else {
            return vec![TextSegment::plain(text)];
        };

        let boundary = Regex::new(r"[.!?]+").unwrap();
        let mut segments = Vec::new();
        let mut cursor = 0;
        for m in boundary.find_iter(text) {
            let chunk = &text[cursor..m.end()];
            segments.push(TextSegment {
                text: chunk.to_string(),
                highlighted: keyword_pattern.is_match(chunk),
            });
            cursor = m.end();
        }

        if segments.is_empty() {
            // No sentence boundaries at all: mark line by line instead.
            return text
                .split_inclusive('\n')
                .map(|line| TextSegment {
                    text: line.to_string(),
                    highlighted: keyword_pattern.is_match(line),
                })
                .collect();
        }

        if cursor < text.len() {
            let rest = &text[cursor..];
            segments.push(TextSegment {
                text: rest.to_string(),
                highlighted: keyword_pattern.is_match(rest),
            });
        }
        segments
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Case-insensitive whole-word pattern over the escaped tokens. Tokens are
/// regex-escaped so metacharacters in query text cannot produce malformed
/// patterns.
fn word_pattern(tokens: &[String]) -> Option<Regex> {
    if tokens.is_empty() {
        return None;
    }
    let escaped: Vec<String> = tokens.iter().map(|t| regex::escape(t)).collect();
    RegexBuilder::new(&format!(r"\b(?:{})\b", escaped.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}
