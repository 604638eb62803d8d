//! Corpus vocabulary for TF-IDF vectorization.
//!
//! The vocabulary assigns every retained term a stable index into the
//! dense vector space and carries the document frequencies needed for
//! IDF weighting. It is built once over the full catalog, so every item
//! vector shares one coordinate space.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::Analyzer;
use crate::config::ContentConfig;
use crate::error::Result;

/// Statistics about term frequencies for vocabulary building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermStats {
    /// Total frequency of this term across all documents.
    pub term_freq: usize,
    /// Number of documents containing this term.
    pub doc_freq: usize,
    /// Index of this term in the vector space.
    pub index: usize,
}

/// Vocabulary mapping terms to vector indices and document frequencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Map from term to its statistics.
    term_to_stats: AHashMap<String, TermStats>,
    /// Map from term index to term string.
    index_to_term: Vec<String>,
    /// Total number of documents in the corpus.
    total_docs: usize,
    /// Total number of terms processed.
    total_terms: usize,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self {
            term_to_stats: AHashMap::new(),
            index_to_term: Vec::new(),
            total_docs: 0,
            total_terms: 0,
        }
    }

    /// Build a vocabulary from a collection of documents.
    ///
    /// Term indices are assigned in a deterministic order (document
    /// frequency descending, then term ascending), so two builds over
    /// the same corpus produce identical vector spaces.
    pub fn build(
        documents: &[String],
        analyzer: &dyn Analyzer,
        config: &ContentConfig,
    ) -> Result<Self> {
        let mut term_counts: AHashMap<String, usize> = AHashMap::new();
        let mut doc_counts: AHashMap<String, usize> = AHashMap::new();
        let mut total_terms = 0;

        // First pass: count term and document frequencies.
        for document in documents {
            let tokens = analyzer.analyze(document)?;
            let mut doc_terms = HashSet::new();

            for token in tokens {
                *term_counts.entry(token.text.clone()).or_insert(0) += 1;
                doc_terms.insert(token.text);
                total_terms += 1;
            }

            for term in doc_terms {
                *doc_counts.entry(term).or_insert(0) += 1;
            }
        }

        // Second pass: filter, order, and index.
        let mut filtered_terms: Vec<(String, usize, usize)> = term_counts
            .into_iter()
            .filter_map(|(term, term_freq)| {
                let doc_freq = doc_counts.get(&term).copied().unwrap_or(0);
                (doc_freq >= config.min_doc_freq).then_some((term, term_freq, doc_freq))
            })
            .collect();

        filtered_terms.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        filtered_terms.truncate(config.max_vocab_size);

        let mut vocabulary = Vocabulary::new();
        vocabulary.total_docs = documents.len();
        vocabulary.total_terms = total_terms;

        for (index, (term, term_freq, doc_freq)) in filtered_terms.into_iter().enumerate() {
            vocabulary.term_to_stats.insert(
                term.clone(),
                TermStats {
                    term_freq,
                    doc_freq,
                    index,
                },
            );
            vocabulary.index_to_term.push(term);
        }

        Ok(vocabulary)
    }

    /// Get the size of the vocabulary.
    pub fn size(&self) -> usize {
        self.index_to_term.len()
    }

    /// Check whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.index_to_term.is_empty()
    }

    /// Get the total number of documents the vocabulary was built over.
    pub fn total_docs(&self) -> usize {
        self.total_docs
    }

    /// Get the total number of terms processed during the build.
    pub fn total_terms(&self) -> usize {
        self.total_terms
    }

    /// Get term statistics by term string.
    pub fn get_term_stats(&self, term: &str) -> Option<&TermStats> {
        self.term_to_stats.get(term)
    }

    /// Get term by index.
    pub fn get_term_by_index(&self, index: usize) -> Option<&String> {
        self.index_to_term.get(index)
    }

    /// Calculate IDF (inverse document frequency) for a term.
    ///
    /// Terms outside the vocabulary get 0.0, so they contribute nothing
    /// to query vectors.
    pub fn calculate_idf(&self, term: &str) -> f32 {
        match self.get_term_stats(term) {
            Some(stats) if stats.doc_freq > 0 => {
                (self.total_docs as f32 / stats.doc_freq as f32).ln()
            }
            _ => 0.0,
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_creation() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.size(), 0);
        assert!(vocab.is_empty());
        assert_eq!(vocab.total_docs(), 0);
    }

    #[test]
    fn test_vocabulary_building() {
        let documents = docs(&[
            "the quick brown fox",
            "the lazy dog",
            "quick brown animals",
        ]);

        let analyzer = StandardAnalyzer::new();
        let config = ContentConfig::default();
        let vocab = Vocabulary::build(&documents, &analyzer, &config).unwrap();

        assert!(vocab.size() > 0);
        assert_eq!(vocab.total_docs(), 3);
        // The standard analyzer removes stop words like "the".
        assert!(vocab.get_term_stats("the").is_none());
        assert!(vocab.get_term_stats("quick").is_some());
        assert!(vocab.get_term_stats("brown").is_some());
        assert_eq!(vocab.get_term_stats("quick").unwrap().doc_freq, 2);
        assert_eq!(vocab.get_term_stats("lazy").unwrap().doc_freq, 1);
    }

    #[test]
    fn test_deterministic_ordering() {
        let documents = docs(&["zebra apple", "zebra apple", "mango"]);
        let analyzer = StandardAnalyzer::new();
        let config = ContentConfig::default();

        let vocab = Vocabulary::build(&documents, &analyzer, &config).unwrap();

        // Higher doc_freq first; equal doc_freq ordered by term.
        assert_eq!(vocab.get_term_by_index(0).unwrap(), "apple");
        assert_eq!(vocab.get_term_by_index(1).unwrap(), "zebra");
        assert_eq!(vocab.get_term_by_index(2).unwrap(), "mango");

        let rebuilt = Vocabulary::build(&documents, &analyzer, &config).unwrap();
        for i in 0..vocab.size() {
            assert_eq!(vocab.get_term_by_index(i), rebuilt.get_term_by_index(i));
        }
    }

    #[test]
    fn test_min_doc_freq_filtering() {
        let documents = docs(&["shared rare", "shared other"]);
        let analyzer = StandardAnalyzer::new();
        let config = ContentConfig {
            min_doc_freq: 2,
            ..Default::default()
        };

        let vocab = Vocabulary::build(&documents, &analyzer, &config).unwrap();
        assert_eq!(vocab.size(), 1);
        assert!(vocab.get_term_stats("shared").is_some());
        assert!(vocab.get_term_stats("rare").is_none());
    }

    #[test]
    fn test_max_vocab_size_truncation() {
        let documents = docs(&["alpha beta gamma delta epsilon"]);
        let analyzer = StandardAnalyzer::new();
        let config = ContentConfig {
            max_vocab_size: 2,
            ..Default::default()
        };

        let vocab = Vocabulary::build(&documents, &analyzer, &config).unwrap();
        assert_eq!(vocab.size(), 2);
        // All terms tie at doc_freq 1, so the alphabetically first stay.
        assert_eq!(vocab.get_term_by_index(0).unwrap(), "alpha");
        assert_eq!(vocab.get_term_by_index(1).unwrap(), "beta");
    }

    #[test]
    fn test_idf_calculation() {
        let documents = docs(&[
            "cat sat mat",
            "dog ran park",
            "cat dog pets",
        ]);

        let analyzer = StandardAnalyzer::new();
        let config = ContentConfig::default();
        let vocab = Vocabulary::build(&documents, &analyzer, &config).unwrap();

        // "cat" appears in 2/3 documents, "mat" in 1/3.
        let idf_cat = vocab.calculate_idf("cat");
        let idf_mat = vocab.calculate_idf("mat");
        assert!(idf_cat > 0.0);
        assert!(idf_mat > idf_cat);
        assert!((idf_cat - (3.0_f32 / 2.0).ln()).abs() < 1e-6);
        assert!((idf_mat - 3.0_f32.ln()).abs() < 1e-6);

        // Unknown terms contribute nothing.
        assert_eq!(vocab.calculate_idf("submarine"), 0.0);
    }
}
