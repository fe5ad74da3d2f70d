//! # Tokenizer Module
//!
//! ## Purpose
//! Text normalization and tokenization for queries and decision fields,
//! tuned for mixed Turkish/English legal text.
//!
//! ## Input/Output Specification
//! - **Input**: Raw query strings, decision field text
//! - **Output**: Ordered sequences of normalized tokens
//! - **Normalization**: Lowercasing, punctuation stripping, whitespace collapse
//!
//! ## Key Features
//! - Unicode-aware normalization that preserves Turkish diacritics
//! - Combined Turkish and English stop word filtering for queries
//! - Order-preserving deduplication of query tokens
//! - Field tokenization without stop word filtering, so decision text keeps
//!   its function words available for matching

use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Common Turkish and English function words excluded from query tokens.
const STOP_WORDS: &[&str] = &[
    // English
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "can", "this", "that",
    "these", "those", "it", "its", "they", "them", "their", "there", "here", "where", "when",
    "what", "which", "who", "how", "why",
    // Turkish
    "ve", "ile", "için", "gibi", "kadar", "daha", "çok", "az", "en", "bir", "bu", "şu", "o",
    "bunlar", "şunlar", "onlar", "ben", "sen", "biz", "siz", "benim", "senin", "onun", "bizim",
    "sizin", "onların", "burada", "şurada", "orada", "nerede", "ne", "hangi", "kim", "nasıl",
    "niye", "niçin", "neden", "de", "da", "te", "ta", "mi", "mı", "mu", "mü", "ki", "ise",
    "olan", "birkaç", "bazı", "hep", "her", "hiç", "tüm", "bütün",
];

/// Query and field tokenizer
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<&'static str>,
    min_token_length: usize,
}

impl Tokenizer {
    /// Create a tokenizer with the given minimum token length
    pub fn new(min_token_length: usize) -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            min_token_length,
        }
    }

    /// Normalize text for matching: lowercase, replace punctuation with
    /// spaces, collapse whitespace runs, and trim.
    ///
    /// Only non-word characters are stripped; Turkish diacritics survive
    /// normalization unchanged. Combining marks produced by lowercasing
    /// (e.g. dotted capital I) are kept attached to their base character.
    pub fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.nfc().flat_map(char::to_lowercase) {
            if c.is_alphanumeric() || c == '_' || is_combining_mark(c) {
                out.push(c);
            } else {
                out.push(' ');
            }
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Tokenize a free-text query.
    ///
    /// Normalizes, splits on whitespace, drops tokens shorter than the
    /// configured minimum length, drops stop words, and deduplicates while
    /// preserving first-seen order. An empty or stop-word-only query yields
    /// an empty token list.
    pub fn tokenize_query(&self, query: &str) -> Vec<String> {
        let normalized = self.normalize(query);
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for word in normalized.split(' ') {
            if word.chars().count() < self.min_token_length {
                continue;
            }
            if self.stop_words.contains(word) {
                continue;
            }
            if seen.insert(word.to_string()) {
                tokens.push(word.to_string());
            }
        }
        tokens
    }

    /// Tokenize decision field text.
    ///
    /// Same normalization and length filter as query tokenization, but no
    /// stop word filtering: a query token is allowed to match a function
    /// word appearing in a field.
    pub fn field_tokens(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split_whitespace()
            .filter(|w| w.chars().count() >= self.min_token_length)
            .map(|w| w.to_string())
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_yields_no_tokens() {
        let tokenizer = Tokenizer::default();
        assert!(tokenizer.tokenize_query("").is_empty());
        assert!(tokenizer.tokenize_query("   \t\n ").is_empty());
    }

    #[test]
    fn test_stop_words_only_yields_no_tokens() {
        let tokenizer = Tokenizer::default();
        assert!(tokenizer.tokenize_query("the and için gibi").is_empty());
    }

    #[test]
    fn test_short_tokens_dropped() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.tokenize_query("ab söz"), vec!["söz"]);
    }

    #[test]
    fn test_turkish_diacritics_preserved() {
        let tokenizer = Tokenizer::default();
        // Dotted capital I lowercases to 'i' plus a combining dot above,
        // which must stay attached instead of splitting the token.
        assert_eq!(
            tokenizer.normalize("Döviz İşlemleri!"),
            "döviz i\u{307}şlemleri"
        );
        assert_eq!(
            tokenizer.tokenize_query("sözleşme, feshi"),
            vec!["sözleşme", "feshi"]
        );
    }

    #[test]
    fn test_punctuation_replaced_and_whitespace_collapsed() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.normalize("alım-satım   (future)  işlemi"),
            "alım satım future işlemi"
        );
    }

    #[test]
    fn test_deduplication_preserves_first_seen_order() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.tokenize_query("tazminat faiz tazminat alacak faiz"),
            vec!["tazminat", "faiz", "alacak"]
        );
    }

    #[test]
    fn test_tokenize_idempotent_on_own_output() {
        let tokenizer = Tokenizer::default();
        let first = tokenizer.tokenize_query("Vadeli döviz alım-satım FUTURE işlemi!");
        let second = tokenizer.tokenize_query(&first.join(" "));
        assert_eq!(first, second);
    }

    #[test]
    fn test_field_tokens_keep_stop_words() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.field_tokens("karar ile ilgili olan metin");
        assert!(tokens.contains(&"ile".to_string()));
        assert!(tokens.contains(&"olan".to_string()));
        assert!(tokens.contains(&"karar".to_string()));
    }
}
