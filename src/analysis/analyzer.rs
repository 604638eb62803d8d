//! Analyzers that combine a tokenizer with a chain of filters.
//!
//! # Pipeline
//!
//! The [`StandardAnalyzer`] used by the content feature builder runs:
//!
//! 1. [`WordTokenizer`](crate::analysis::tokenizer::WordTokenizer) (Unicode word boundaries)
//! 2. [`LowercaseFilter`](crate::analysis::filter::LowercaseFilter)
//! 3. [`LengthFilter`](crate::analysis::filter::LengthFilter) (minimum 2 characters)
//! 4. [`StopWordFilter`](crate::analysis::filter::StopWordFilter) (33 common English words)
//!
//! # Examples
//!
//! ```
//! use biblos::analysis::analyzer::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("The Spice must FLOW!").unwrap().collect();
//!
//! // "The" is a stop word; the rest is lowercased
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "spice");
//! assert_eq!(tokens[1].text, "must");
//! assert_eq!(tokens[2].text, "flow");
//! ```

use std::sync::Arc;

use crate::analysis::filter::{LengthFilter, LowercaseFilter, StopWordFilter, TokenFilter};
use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::{Tokenizer, WordTokenizer};
use crate::error::Result;

/// Trait for analyzers that convert text into a token stream.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text into a token stream.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A configurable analyzer that combines a tokenizer with a filter chain.
///
/// Filters are applied sequentially in the order they were added.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn TokenFilter>>,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Add a filter to the end of the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn TokenFilter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

/// The standard analyzer used by the content feature builder.
///
/// Word tokenization, lowercasing, short-token removal, and English stop
/// word filtering. Suitable for book metadata in English and other
/// space-separated languages.
pub struct StandardAnalyzer {
    inner: PipelineAnalyzer,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer with default settings.
    pub fn new() -> Self {
        Self::with_min_token_len(2)
    }

    /// Create a standard analyzer with a custom minimum token length.
    pub fn with_min_token_len(min_token_len: usize) -> Self {
        let inner = PipelineAnalyzer::new(Arc::new(WordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(LengthFilter::with_min_length(min_token_len)))
            .add_filter(Arc::new(StopWordFilter::new()));

        StandardAnalyzer { inner }
    }

    /// Create a standard analyzer without stop word filtering.
    pub fn without_stop_words() -> Self {
        let inner = PipelineAnalyzer::new(Arc::new(WordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(LengthFilter::new()));

        StandardAnalyzer { inner }
    }

    /// Get the inner pipeline analyzer.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}
