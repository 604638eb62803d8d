//! Engine configuration types.
//!
//! [`EngineConfig`] bundles the tunables for the content model, the
//! collaborative model, and the hybrid blender. All fields have sensible
//! defaults, so `EngineConfig::default()` is a working configuration.
//!
//! # Examples
//!
//! ```
//! use biblos::config::EngineConfig;
//! use biblos::similarity::SimilarityMetric;
//!
//! let config = EngineConfig::default()
//!     .with_metric(SimilarityMetric::Pearson)
//!     .with_weights(0.7, 0.3);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BiblosError, Result};
use crate::similarity::SimilarityMetric;

/// Configuration for the content-based model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Minimum number of documents a term must appear in to enter the
    /// vocabulary.
    pub min_doc_freq: usize,
    /// Maximum vocabulary size. Terms beyond this are dropped, rarest
    /// first.
    pub max_vocab_size: usize,
    /// Minimum token length kept by the analyzer.
    pub min_token_len: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_doc_freq: 1,
            max_vocab_size: 50_000,
            min_token_len: 2,
        }
    }
}

/// Configuration for the collaborative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeConfig {
    /// Similarity metric used over sparse rating vectors.
    pub metric: SimilarityMetric,
    /// Minimum number of ratings an item needs before it can be scored.
    /// Items below this threshold are cold and produce no neighbors.
    pub min_interactions: usize,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::Cosine,
            min_interactions: 2,
        }
    }
}

/// Configuration for blending content and collaborative scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridConfig {
    /// Weight applied to content similarity scores.
    pub content_weight: f32,
    /// Weight applied to collaborative similarity scores.
    pub collaborative_weight: f32,
    /// Each model contributes a candidate pool of `k * pool_multiplier`
    /// before blending, so items strong on one side only still surface.
    pub pool_multiplier: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            content_weight: 0.5,
            collaborative_weight: 0.5,
            pool_multiplier: 3,
        }
    }
}

/// Top-level configuration for a recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Content model configuration.
    pub content: ContentConfig,
    /// Collaborative model configuration.
    pub collaborative: CollaborativeConfig,
    /// Hybrid blending configuration.
    pub hybrid: HybridConfig,
}

impl EngineConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collaborative similarity metric.
    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.collaborative.metric = metric;
        self
    }

    /// Set the minimum interaction count for collaborative scoring.
    pub fn with_min_interactions(mut self, min_interactions: usize) -> Self {
        self.collaborative.min_interactions = min_interactions;
        self
    }

    /// Set the hybrid blend weights.
    pub fn with_weights(mut self, content: f32, collaborative: f32) -> Self {
        self.hybrid.content_weight = content;
        self.hybrid.collaborative_weight = collaborative;
        self
    }

    /// Set the minimum document frequency for vocabulary terms.
    pub fn with_min_doc_freq(mut self, min_doc_freq: usize) -> Self {
        self.content.min_doc_freq = min_doc_freq;
        self
    }

    /// Set the maximum vocabulary size.
    pub fn with_max_vocab_size(mut self, max_vocab_size: usize) -> Self {
        self.content.max_vocab_size = max_vocab_size;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.content.max_vocab_size == 0 {
            return Err(BiblosError::invalid_config(
                "max_vocab_size must be greater than zero",
            ));
        }
        if self.hybrid.pool_multiplier == 0 {
            return Err(BiblosError::invalid_config(
                "pool_multiplier must be greater than zero",
            ));
        }
        let wc = self.hybrid.content_weight;
        let wcf = self.hybrid.collaborative_weight;
        if !wc.is_finite() || !wcf.is_finite() {
            return Err(BiblosError::invalid_weights(
                "blend weights must be finite",
            ));
        }
        if wc < 0.0 || wcf < 0.0 {
            return Err(BiblosError::invalid_weights(
                "blend weights must be non-negative",
            ));
        }
        if wc + wcf == 0.0 {
            return Err(BiblosError::invalid_weights(
                "blend weights must not both be zero",
            ));
        }
        Ok(())
    }

    /// Serialize this configuration to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
