//! Types for hybrid recommendation requests and results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::HybridConfig;
use crate::error::{BiblosError, Result};

/// Which signal produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// TF-IDF content similarity only.
    Content,
    /// Collaborative filtering only.
    Collaborative,
    /// Weighted blend of both.
    Hybrid,
}

impl RecommendationSource {
    /// Get the name of this source.
    pub fn name(&self) -> &'static str {
        match self {
            RecommendationSource::Content => "content",
            RecommendationSource::Collaborative => "collaborative",
            RecommendationSource::Hybrid => "hybrid",
        }
    }
}

/// Recommendation method selecting how scores are blended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Content similarity only: weights `(1, 0)`.
    Content,
    /// Collaborative filtering only: weights `(0, 1)`.
    Collaborative,
    /// Blend both sides with the configured weights.
    #[default]
    Hybrid,
}

impl Method {
    /// Get the name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Content => "content",
            Method::Collaborative => "collaborative",
            Method::Hybrid => "hybrid",
        }
    }

    /// The blend weights this method implies.
    pub fn weights(&self, config: &HybridConfig) -> BlendWeights {
        match self {
            Method::Content => BlendWeights::new(1.0, 0.0),
            Method::Collaborative => BlendWeights::new(0.0, 1.0),
            Method::Hybrid => {
                BlendWeights::new(config.content_weight, config.collaborative_weight)
            }
        }
    }
}

impl FromStr for Method {
    type Err = BiblosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "content" => Ok(Method::Content),
            "collaborative" | "collab" => Ok(Method::Collaborative),
            "hybrid" => Ok(Method::Hybrid),
            _ => Err(BiblosError::invalid_config(format!(
                "unknown recommendation method: {s}"
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<Method> for RecommendationSource {
    fn from(method: Method) -> Self {
        match method {
            Method::Content => RecommendationSource::Content,
            Method::Collaborative => RecommendationSource::Collaborative,
            Method::Hybrid => RecommendationSource::Hybrid,
        }
    }
}

/// Weights for blending content and collaborative scores.
///
/// Weights do not have to sum to 1; they are normalized before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    /// Weight for the content side.
    pub content: f32,
    /// Weight for the collaborative side.
    pub collaborative: f32,
}

impl BlendWeights {
    /// Create new blend weights.
    pub fn new(content: f32, collaborative: f32) -> Self {
        Self {
            content,
            collaborative,
        }
    }

    /// Normalize the weights to sum to 1.
    ///
    /// Rejects non-finite, negative, or all-zero weights.
    pub fn normalized(&self) -> Result<(f32, f32)> {
        if !self.content.is_finite() || !self.collaborative.is_finite() {
            return Err(BiblosError::invalid_weights("blend weights must be finite"));
        }
        if self.content < 0.0 || self.collaborative < 0.0 {
            return Err(BiblosError::invalid_weights(
                "blend weights must be non-negative",
            ));
        }
        let sum = self.content + self.collaborative;
        if sum == 0.0 {
            return Err(BiblosError::invalid_weights(
                "blend weights must not both be zero",
            ));
        }
        Ok((self.content / sum, self.collaborative / sum))
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

/// A single ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The recommended item.
    pub item_id: String,
    /// Title of the recommended item.
    pub title: String,
    /// Blended score, higher is better.
    pub score: f32,
    /// Which signal produced this recommendation.
    pub source: RecommendationSource,
}

impl Recommendation {
    /// Create a new recommendation.
    pub fn new<I, T>(item_id: I, title: T, score: f32, source: RecommendationSource) -> Self
    where
        I: Into<String>,
        T: Into<String>,
    {
        Self {
            item_id: item_id.into(),
            title: title.into(),
            score,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("content".parse::<Method>().unwrap(), Method::Content);
        assert_eq!("Hybrid".parse::<Method>().unwrap(), Method::Hybrid);
        assert_eq!(
            "COLLAB".parse::<Method>().unwrap(),
            Method::Collaborative
        );
        assert!("nearest".parse::<Method>().is_err());
    }

    #[test]
    fn test_method_weights() {
        let config = HybridConfig::default();

        let content = Method::Content.weights(&config);
        assert_eq!((content.content, content.collaborative), (1.0, 0.0));

        let collaborative = Method::Collaborative.weights(&config);
        assert_eq!(
            (collaborative.content, collaborative.collaborative),
            (0.0, 1.0)
        );

        let hybrid = Method::Hybrid.weights(&config);
        assert_eq!((hybrid.content, hybrid.collaborative), (0.5, 0.5));
    }

    #[test]
    fn test_weights_normalization() {
        let (wc, wcf) = BlendWeights::new(2.0, 2.0).normalized().unwrap();
        assert_eq!((wc, wcf), (0.5, 0.5));

        let (wc, wcf) = BlendWeights::new(3.0, 1.0).normalized().unwrap();
        assert!((wc - 0.75).abs() < 1e-6);
        assert!((wcf - 0.25).abs() < 1e-6);

        // One-sided weights are fine; only all-zero is rejected.
        assert!(BlendWeights::new(1.0, 0.0).normalized().is_ok());
    }

    #[test]
    fn test_weights_rejections() {
        assert!(BlendWeights::new(0.0, 0.0).normalized().is_err());
        assert!(BlendWeights::new(-1.0, 2.0).normalized().is_err());
        assert!(BlendWeights::new(f32::NAN, 1.0).normalized().is_err());
        assert!(BlendWeights::new(f32::INFINITY, 1.0).normalized().is_err());
    }

    #[test]
    fn test_source_from_method() {
        assert_eq!(
            RecommendationSource::from(Method::Content),
            RecommendationSource::Content
        );
        assert_eq!(RecommendationSource::Hybrid.name(), "hybrid");
    }
}
