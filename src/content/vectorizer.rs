//! TF-IDF vectorization of catalog documents.
//!
//! The vectorizer turns an analyzed document into a dense vector over
//! the vocabulary's coordinate space: normalized term frequency times
//! inverse document frequency per term, then L2 normalization so cosine
//! comparisons are magnitude-invariant. Documents that analyze to no
//! vocabulary terms become zero vectors.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::config::ContentConfig;
use crate::content::vocabulary::Vocabulary;
use crate::error::Result;
use crate::similarity::Vector;

/// Batches below this size are vectorized sequentially.
const PARALLEL_THRESHOLD: usize = 100;

/// Converts text into TF-IDF vectors over a shared vocabulary.
pub struct TfIdfVectorizer {
    /// Text analyzer for tokenization.
    analyzer: Box<dyn Analyzer>,
    /// Content model configuration.
    config: ContentConfig,
}

impl TfIdfVectorizer {
    /// Create a new vectorizer with the standard analyzer.
    pub fn new(config: ContentConfig) -> Self {
        let analyzer = Box::new(StandardAnalyzer::with_min_token_len(config.min_token_len));
        Self { analyzer, config }
    }

    /// Create a vectorizer with a custom analyzer.
    pub fn with_analyzer(config: ContentConfig, analyzer: Box<dyn Analyzer>) -> Self {
        Self { analyzer, config }
    }

    /// Build a vocabulary over the given documents.
    pub fn fit(&self, documents: &[String]) -> Result<Vocabulary> {
        Vocabulary::build(documents, self.analyzer.as_ref(), &self.config)
    }

    /// Vectorize a single document against a fitted vocabulary.
    pub fn transform(&self, text: &str, vocabulary: &Vocabulary) -> Result<Vector> {
        let tokens = self.analyzer.analyze(text)?;

        let mut term_freqs: AHashMap<String, usize> = AHashMap::new();
        let mut total_terms = 0usize;
        for token in tokens {
            *term_freqs.entry(token.text).or_insert(0) += 1;
            total_terms += 1;
        }

        let mut vector = Vector::zeros(vocabulary.size());
        if total_terms == 0 {
            return Ok(vector);
        }

        for (term, tf) in term_freqs {
            if let Some(stats) = vocabulary.get_term_stats(&term) {
                let tf_norm = tf as f32 / total_terms as f32;
                let idf = vocabulary.calculate_idf(&term);
                vector.data[stats.index] = tf_norm * idf;
            }
        }

        vector.normalize();
        Ok(vector)
    }

    /// Vectorize a batch of documents, preserving input order.
    pub fn transform_batch(
        &self,
        documents: &[String],
        vocabulary: &Vocabulary,
    ) -> Result<Vec<Vector>> {
        if documents.len() < PARALLEL_THRESHOLD {
            return documents
                .iter()
                .map(|text| self.transform(text, vocabulary))
                .collect();
        }

        documents
            .par_iter()
            .map(|text| self.transform(text, vocabulary))
            .collect()
    }

    /// Build a vocabulary and vectorize the documents in one pass.
    pub fn fit_transform(&self, documents: &[String]) -> Result<(Vocabulary, Vec<Vector>)> {
        let vocabulary = self.fit(documents)?;
        let vectors = self.transform_batch(documents, &vocabulary)?;
        Ok((vocabulary, vectors))
    }

    /// Get the configuration for this vectorizer.
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_transform_produces_unit_vectors() {
        let documents = docs(&["desert planet spice", "galactic empire decline"]);
        let vectorizer = TfIdfVectorizer::new(ContentConfig::default());
        let (vocab, vectors) = vectorizer.fit_transform(&documents).unwrap();

        assert_eq!(vectors.len(), 2);
        for vector in &vectors {
            assert_eq!(vector.dimension(), vocab.size());
            assert!((vector.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_empty_text_becomes_zero_vector() {
        let documents = docs(&["desert planet", ""]);
        let vectorizer = TfIdfVectorizer::new(ContentConfig::default());
        let (vocab, vectors) = vectorizer.fit_transform(&documents).unwrap();

        assert_eq!(vectors[1].dimension(), vocab.size());
        assert_eq!(vectors[1].norm(), 0.0);
    }

    #[test]
    fn test_out_of_vocabulary_terms_are_ignored() {
        let documents = docs(&["desert planet"]);
        let vectorizer = TfIdfVectorizer::new(ContentConfig::default());
        let vocab = vectorizer.fit(&documents).unwrap();

        // A document of entirely unseen terms vectorizes to zero.
        let vector = vectorizer.transform("submarine warfare", &vocab).unwrap();
        assert_eq!(vector.norm(), 0.0);
    }

    #[test]
    fn test_shared_terms_raise_similarity() {
        let documents = docs(&[
            "desert planet spice empire",
            "desert planet sand worms",
            "french cooking recipes butter",
        ]);
        let vectorizer = TfIdfVectorizer::new(ContentConfig::default());
        let (_, vectors) = vectorizer.fit_transform(&documents).unwrap();

        let sim_related = crate::similarity::cosine(&vectors[0].data, &vectors[1].data).unwrap();
        let sim_unrelated = crate::similarity::cosine(&vectors[0].data, &vectors[2].data).unwrap();
        assert!(sim_related > sim_unrelated);
        assert_eq!(sim_unrelated, 0.0);
    }

    #[test]
    fn test_transform_batch_preserves_order() {
        let documents = docs(&["alpha one", "beta two", "gamma three"]);
        let vectorizer = TfIdfVectorizer::new(ContentConfig::default());
        let vocab = vectorizer.fit(&documents).unwrap();

        let batch = vectorizer.transform_batch(&documents, &vocab).unwrap();
        for (text, expected) in documents.iter().zip(&batch) {
            let single = vectorizer.transform(text, &vocab).unwrap();
            assert_eq!(&single, expected);
        }
    }
}
