//! # Tokenizer Module
//!
//! ## Purpose
//! Turns raw statute text and queries into a sequence of normalized index
//! terms: lowercased, punctuation-stripped, short tokens and stopwords removed.
//!
//! ## Input/Output Specification
//! - **Input**: Raw text (documents or queries)
//! - **Output**: Lazy, finite, restartable sequence of terms
//! - **Guarantees**: No side effects, never fails, identical output for
//!   identical input
//!
//! ## Normalization rule
//! Text is NFC-normalized and lowercased, every character that is not a letter
//! or digit becomes a space, and the result is split on whitespace runs. Tokens
//! of two characters or fewer and tokens in the stopword set are dropped. This
//! deliberately destroys punctuation inside section labels ("2(1)(d)"); the
//! exact-lookup path in [`crate::search`] therefore never goes through the
//! tokenizer and compares raw section numbers instead.

use crate::config::TokenizerConfig;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Common English function words excluded from indexing.
///
/// Closed list; domain-specific additions come in through
/// [`TokenizerConfig::extra_stopwords`].
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "shall", "any", "or", "which",
    "this", "such", "may", "been", "have", "not", "but", "if", "when", "all", "so", "would",
    "there", "their", "what", "them", "than", "other",
];

/// Text normalizer and term extractor
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
    min_token_chars: usize,
}

impl Tokenizer {
    /// Create a tokenizer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let mut stopwords: HashSet<String> = STOPWORDS.iter().map(|s| s.to_string()).collect();
        for word in &config.extra_stopwords {
            stopwords.insert(word.to_lowercase());
        }
        Self {
            stopwords,
            min_token_chars: config.min_token_chars,
        }
    }

    /// Tokenize text into normalized terms.
    ///
    /// Returns a fresh iterator on every call; tokenizing the same input twice
    /// yields identical sequences. Empty or whitespace-only input yields an
    /// empty sequence.
    pub fn tokenize(&self, text: &str) -> Tokens<'_> {
        let scrubbed: String = text
            .nfc()
            .flat_map(char::to_lowercase)
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        Tokens {
            scrubbed,
            pos: 0,
            tokenizer: self,
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}

/// Lazy token sequence over one input text.
///
/// Owns the scrubbed buffer so the iterator stays independent of the caller's
/// string lifetime.
pub struct Tokens<'t> {
    scrubbed: String,
    pos: usize,
    tokenizer: &'t Tokenizer,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            // Scrubbing replaced every separator with an ASCII space, so byte
            // positions around ' ' are always char boundaries.
            let rest = &self.scrubbed[self.pos..];
            let start = rest.find(|c: char| c != ' ')?;
            let word = &rest[start..];
            let end = word.find(' ').unwrap_or(word.len());
            let token = &word[..end];
            self.pos += start + end;

            if token.chars().count() > self.tokenizer.min_token_chars
                && !self.tokenizer.stopwords.contains(token)
            {
                return Some(token.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        let tokenizer = Tokenizer::default();
        let tokens: Vec<String> = tokenizer
            .tokenize("Cheating, dishonestly-inducing DELIVERY!")
            .collect();
        assert_eq!(tokens, vec!["cheating", "dishonestly", "inducing", "delivery"]);
    }

    #[test]
    fn drops_stopwords_and_short_tokens() {
        let tokenizer = Tokenizer::default();
        let tokens: Vec<String> = tokenizer
            .tokenize("the delivery of an ox to it")
            .collect();
        // "the"/"of"/"an"/"to"/"it" are stopwords, "ox" is too short
        assert_eq!(tokens, vec!["delivery"]);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.tokenize("").count(), 0);
        assert_eq!(tokenizer.tokenize("   \t\n ").count(), 0);
    }

    #[test]
    fn restartable_and_deterministic() {
        let tokenizer = Tokenizer::default();
        let first: Vec<String> = tokenizer.tokenize("criminal breach of trust").collect();
        let second: Vec<String> = tokenizer.tokenize("criminal breach of trust").collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["criminal", "breach", "trust"]);
    }

    #[test]
    fn section_labels_dissolve_into_short_fragments() {
        // Parenthesized sub-clause labels lose their punctuation and every
        // fragment falls under the length floor; the exact-lookup path is the
        // only way to reach such sections.
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.tokenize("2(1)(d)").count(), 0);
    }

    #[test]
    fn extra_stopwords_are_honored() {
        let config = TokenizerConfig {
            extra_stopwords: vec!["whoever".to_string()],
            ..TokenizerConfig::default()
        };
        let tokenizer = Tokenizer::new(&config);
        let tokens: Vec<String> = tokenizer.tokenize("whoever commits theft").collect();
        assert_eq!(tokens, vec!["commits", "theft"]);
    }
}
