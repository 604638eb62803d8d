//! Text analysis pipeline for the content feature builder.
//!
//! Item metadata is normalized here before TF-IDF weighting: the tokenizer
//! splits text on Unicode word boundaries (dropping punctuation), and the
//! filter chain lowercases, removes short tokens, and removes stop words.

pub mod analyzer;
pub mod filter;
pub mod token;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer, StandardAnalyzer};
pub use filter::{LengthFilter, LowercaseFilter, StopWordFilter, TokenFilter};
pub use token::{Token, TokenStream};
pub use tokenizer::{Tokenizer, WordTokenizer};
