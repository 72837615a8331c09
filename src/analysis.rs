//! Text analysis: turns raw document text into a term frequency bag.
//!
//! The pipeline splits on Unicode word boundaries (UAX #29), lowercases,
//! and drops short tokens, numeric tokens and English stop words.
//!
//! # Examples
//!
//! ```
//! use labelbench::analysis::TextAnalyzer;
//! use labelbench::config::AnalysisConfig;
//!
//! let analyzer = TextAnalyzer::new(AnalysisConfig::default());
//! let bag = analyzer.term_frequencies("The oil price rose; oil stocks fell.");
//!
//! assert_eq!(bag.get("oil"), Some(&2));
//! assert!(!bag.contains_key("the"));
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::AnalysisConfig;

/// Default English stop words list.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with", "said", "its", "from", "has", "had", "have",
    "he", "she", "we", "would", "which", "were", "been", "also", "than", "s", "mln", "pct",
];

/// Term -> raw count, in first-occurrence order.
pub type TermFrequencies = IndexMap<String, u32>;

/// Tokenizer and filter chain configured by [`AnalysisConfig`].
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    config: AnalysisConfig,
    stop_words: HashSet<&'static str>,
}

impl TextAnalyzer {
    /// Create an analyzer from its configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        let stop_words = if config.stop_words {
            DEFAULT_ENGLISH_STOP_WORDS.iter().copied().collect()
        } else {
            HashSet::new()
        };
        TextAnalyzer { config, stop_words }
    }

    /// Split `text` into normalised terms, in text order.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.unicode_words()
            .map(|word| word.to_lowercase())
            .filter(move |word| self.keep(word))
    }

    /// Count the terms of `text`.
    pub fn term_frequencies(&self, text: &str) -> TermFrequencies {
        let mut bag = TermFrequencies::new();
        for term in self.tokenize(text) {
            *bag.entry(term).or_insert(0) += 1;
        }
        bag
    }

    fn keep(&self, word: &str) -> bool {
        if word.chars().count() < self.config.min_token_length {
            return false;
        }
        if self.config.drop_numeric && word.chars().all(|c| c.is_numeric() || c == '.' || c == ',')
        {
            return false;
        }
        !self.stop_words.contains(word)
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_filters() {
        let analyzer = TextAnalyzer::default();
        let terms: Vec<String> = analyzer
            .tokenize("The Wheat harvest of 1987 rose 3.5 pct, a record")
            .collect();
        assert_eq!(terms, vec!["wheat", "harvest", "rose", "record"]);
    }

    #[test]
    fn test_term_frequencies_keep_first_occurrence_order() {
        let analyzer = TextAnalyzer::default();
        let bag = analyzer.term_frequencies("gold silver gold copper silver gold");
        let terms: Vec<(&str, u32)> = bag.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        assert_eq!(terms, vec![("gold", 3), ("silver", 2), ("copper", 1)]);
    }

    #[test]
    fn test_stop_words_can_be_disabled() {
        let analyzer = TextAnalyzer::new(AnalysisConfig {
            min_token_length: 1,
            stop_words: false,
            drop_numeric: false,
        });
        let terms: Vec<String> = analyzer.tokenize("the 2 crops").collect();
        assert_eq!(terms, vec!["the", "2", "crops"]);
    }

    #[test]
    fn test_empty_text() {
        let analyzer = TextAnalyzer::default();
        assert!(analyzer.term_frequencies("  ,;. ").is_empty());
    }
}
