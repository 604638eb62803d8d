//! Shared vector and similarity math for both models.
//!
//! The content model works with dense TF-IDF vectors ([`Vector`]) and
//! cosine similarity in `[0, 1]`. The collaborative model works with
//! sparse per-item rating postings and either cosine (`[0, 1]`) or
//! Pearson correlation (`[-1, 1]`), chosen per fitted model via
//! [`SimilarityMetric`].
//!
//! Both models rank with [`rank_neighbors`]: descending score, ties broken
//! by ascending `item_id`, truncated to `k`. This single rule is what
//! makes every query deterministic.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{BiblosError, Result};

/// Batches below this size are scored sequentially.
const PARALLEL_THRESHOLD: usize = 100;

/// A dense vector representation for content similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// The vector components.
    pub data: Vec<f32>,
}

impl Vector {
    /// Create a new vector with the given components.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Create a zero vector of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        Self {
            data: vec![0.0; dimension],
        }
    }

    /// Get the dimensionality of this vector.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Calculate the L2 norm (magnitude) of this vector.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize this vector to unit length. Zero vectors stay zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.data {
                *value /= norm;
            }
        }
    }

    /// Get a normalized copy of this vector.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.normalize();
        normalized
    }

    /// Add `weight * other` to this vector in place.
    ///
    /// Used to accumulate rating-weighted user profiles.
    pub fn add_scaled(&mut self, other: &Vector, weight: f32) -> Result<()> {
        if self.data.len() != other.data.len() {
            return Err(BiblosError::DimensionMismatch {
                expected: self.data.len(),
                found: other.data.len(),
            });
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += weight * b;
        }
        Ok(())
    }
}

/// Cosine similarity between two dense vectors, clamped to `[0, 1]`.
///
/// Angle-based and magnitude-invariant, so documents of very different
/// lengths compare fairly. Zero vectors score 0 against everything.
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(BiblosError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(0.0, 1.0))
}

/// Cosine similarity between one query vector and a batch of vectors.
///
/// Order-preserving; large batches are scored in parallel.
pub fn batch_cosine(query: &[f32], vectors: &[Vector]) -> Result<Vec<f32>> {
    if vectors.len() < PARALLEL_THRESHOLD {
        return vectors.iter().map(|v| cosine(query, &v.data)).collect();
    }

    vectors
        .par_iter()
        .map(|v| cosine(query, &v.data))
        .collect()
}

/// Similarity metrics for the collaborative model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity over co-rating users. Scores in `[0, 1]`.
    #[default]
    Cosine,
    /// Pearson correlation over co-rating users. Scores in `[-1, 1]`.
    Pearson,
}

impl SimilarityMetric {
    /// Get the name of this metric.
    pub fn name(&self) -> &'static str {
        match self {
            SimilarityMetric::Cosine => "cosine",
            SimilarityMetric::Pearson => "pearson",
        }
    }

    /// The inclusive score range this metric produces.
    pub fn score_range(&self) -> (f32, f32) {
        match self {
            SimilarityMetric::Cosine => (0.0, 1.0),
            SimilarityMetric::Pearson => (-1.0, 1.0),
        }
    }

    /// Score two sparse rating vectors with this metric.
    ///
    /// Returns `None` when there is no usable signal between the pair
    /// (no co-rating users, or not enough for the metric to be defined).
    pub fn score_sparse(&self, a: &[(u32, f32)], b: &[(u32, f32)]) -> Option<f32> {
        match self {
            SimilarityMetric::Cosine => sparse_cosine(a, b),
            SimilarityMetric::Pearson => sparse_pearson(a, b),
        }
    }
}

/// Cosine similarity between two sparse rating vectors.
///
/// Postings must be sorted by user index ascending. The dot product runs
/// over co-rating users only; norms are taken over each item's full
/// rating vector. Users absent from a posting contribute nothing, since
/// an unobserved interaction is not a zero rating. Returns `None` when
/// the items share no raters or either norm is zero.
pub fn sparse_cosine(a: &[(u32, f32)], b: &[(u32, f32)]) -> Option<f32> {
    let mut dot = 0.0_f32;
    let mut co_raters = 0usize;

    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                co_raters += 1;
                i += 1;
                j += 1;
            }
        }
    }

    if co_raters == 0 {
        return None;
    }

    let norm_a: f32 = a.iter().map(|(_, r)| r * r).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|(_, r)| r * r).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some((dot / (norm_a * norm_b)).clamp(0.0, 1.0))
}

/// Pearson correlation between two sparse rating vectors.
///
/// Computed over the co-rating users, with means taken over that subset.
/// Returns `None` with fewer than two co-rating users or when either
/// side has zero variance (the correlation is undefined there).
pub fn sparse_pearson(a: &[(u32, f32)], b: &[(u32, f32)]) -> Option<f32> {
    let mut common: Vec<(f32, f32)> = Vec::new();

    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                common.push((a[i].1, b[j].1));
                i += 1;
                j += 1;
            }
        }
    }

    if common.len() < 2 {
        return None;
    }

    let n = common.len() as f32;
    let mean_a = common.iter().map(|(x, _)| x).sum::<f32>() / n;
    let mean_b = common.iter().map(|(_, y)| y).sum::<f32>() / n;

    let mut numerator = 0.0;
    let mut sum_sq_a = 0.0;
    let mut sum_sq_b = 0.0;

    for (x, y) in &common {
        let diff_a = x - mean_a;
        let diff_b = y - mean_b;
        numerator += diff_a * diff_b;
        sum_sq_a += diff_a * diff_a;
        sum_sq_b += diff_b * diff_b;
    }

    let denominator = (sum_sq_a * sum_sq_b).sqrt();
    if denominator == 0.0 {
        return None;
    }

    Some((numerator / denominator).clamp(-1.0, 1.0))
}

/// One scored neighbor of a query item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The neighboring item.
    pub item_id: String,
    /// Similarity (or blended) score.
    pub score: f32,
}

impl Neighbor {
    /// Create a new neighbor.
    pub fn new<S: Into<String>>(item_id: S, score: f32) -> Self {
        Neighbor {
            item_id: item_id.into(),
            score,
        }
    }
}

/// Rank neighbors: descending score, ties by ascending `item_id`,
/// truncated to `k`.
pub fn rank_neighbors(mut neighbors: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    neighbors.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    neighbors.truncate(k);
    neighbors
}
