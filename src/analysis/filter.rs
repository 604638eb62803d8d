//! Token filter trait and implementations.
//!
//! Filters transform the token stream produced by a tokenizer. The content
//! feature builder chains [`LowercaseFilter`], [`LengthFilter`], and
//! [`StopWordFilter`] so that item text is case-folded and stripped of
//! noise terms before TF-IDF weighting.
//!
//! # Examples
//!
//! ```
//! use biblos::analysis::filter::{StopWordFilter, TokenFilter};
//! use biblos::analysis::token::Token;
//!
//! let filter = StopWordFilter::new(); // default English stop words
//! let tokens = vec![Token::new("the", 0), Token::new("spice", 1)];
//! let result: Vec<_> = filter
//!     .filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "spice");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait TokenFilter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A filter that converts token text to lowercase.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl TokenFilter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered: Vec<Token> = tokens
            .map(|token| {
                let lowered = token.text.to_lowercase();
                token.with_text(lowered)
            })
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// A filter that removes tokens shorter than a minimum character length.
///
/// Single-character fragments carry almost no signal for item similarity,
/// so the standard pipeline drops them.
#[derive(Clone, Debug)]
pub struct LengthFilter {
    min_length: usize,
}

impl LengthFilter {
    /// Create a length filter with the default minimum of 2 characters.
    pub fn new() -> Self {
        LengthFilter { min_length: 2 }
    }

    /// Create a length filter with a custom minimum length.
    pub fn with_min_length(min_length: usize) -> Self {
        LengthFilter { min_length }
    }

    /// Get the minimum token length this filter keeps.
    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl Default for LengthFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for LengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let min_length = self.min_length;
        let filtered: Vec<Token> = tokens
            .filter(|token| token.text.chars().count() >= min_length)
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "length"
    }
}

/// Default English stop words list.
///
/// Common English words that carry little similarity signal.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Default English stop words as a HashSet.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
#[derive(Clone, Debug)]
pub struct StopWordFilter {
    stop_words: Arc<HashSet<String>>,
}

impl StopWordFilter {
    /// Create a new stop word filter with the default English stop words.
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create a new stop word filter with a custom stop word set.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopWordFilter {
            stop_words: Arc::new(stop_words),
        }
    }

    /// Create a new stop word filter from a list of words.
    ///
    /// # Examples
    ///
    /// ```
    /// use biblos::analysis::filter::StopWordFilter;
    ///
    /// let filter = StopWordFilter::from_words(vec!["foo", "bar"]);
    /// assert!(filter.is_stop_word("foo"));
    /// assert!(!filter.is_stop_word("baz"));
    /// ```
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words = words.into_iter().map(|s| s.into()).collect();
        Self::with_stop_words(stop_words)
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopWordFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for StopWordFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stop_words = Arc::clone(&self.stop_words);
        let filtered: Vec<Token> = tokens
            .filter(|token| !stop_words.contains(&token.text))
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
