//! Item-item collaborative filtering model.
//!
//! Two items are similar when the users who rated them rated them
//! alike. Similarity runs over the sparse rating postings of the
//! [`InteractionMatrix`] with the configured [`SimilarityMetric`].
//!
//! Items with fewer ratings than `min_interactions` are cold: they are
//! never scored, neither as query nor as candidate. A cold query item
//! yields an empty result rather than an error, so callers can fall
//! back to content similarity.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, Interaction};
use crate::collaborative::matrix::InteractionMatrix;
use crate::config::CollaborativeConfig;
use crate::error::{BiblosError, Result};
use crate::similarity::{Neighbor, SimilarityMetric, rank_neighbors};

/// Candidate scans below this many items run sequentially.
const PARALLEL_THRESHOLD: usize = 100;

/// Item-item collaborative filtering over sparse rating vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborativeModel {
    matrix: InteractionMatrix,
    metric: SimilarityMetric,
    min_interactions: usize,
}

impl CollaborativeModel {
    /// Fit a collaborative model from interactions against a catalog.
    pub fn fit(
        interactions: &[Interaction],
        catalog: &Catalog,
        config: &CollaborativeConfig,
    ) -> Self {
        let matrix = InteractionMatrix::build(interactions, catalog);
        debug!(
            users = matrix.user_count(),
            items = matrix.item_count(),
            interactions = matrix.interaction_count(),
            skipped = matrix.skipped_records(),
            metric = config.metric.name(),
            "fitted collaborative model"
        );

        Self {
            matrix,
            metric: config.metric,
            min_interactions: config.min_interactions,
        }
    }

    fn is_cold(&self, index: usize) -> bool {
        self.matrix.rating_count(index) < self.min_interactions
    }

    /// Whether a score is worth keeping under the active metric.
    ///
    /// Cosine scores at 0 carry no signal. Pearson scores are kept in
    /// full, negative correlation included.
    fn keeps(&self, score: f32) -> bool {
        match self.metric {
            SimilarityMetric::Cosine => score > 0.0,
            SimilarityMetric::Pearson => true,
        }
    }

    /// Find the `k` items most similar to the given item.
    ///
    /// Returns [`BiblosError::UnknownItem`] when the item is not in the
    /// catalog the model was fitted over, and an empty list when the
    /// item is known but cold.
    pub fn similar(&self, item_id: &str, k: usize) -> Result<Vec<Neighbor>> {
        let query_index = self
            .matrix
            .item_index(item_id)
            .ok_or_else(|| BiblosError::unknown_item(item_id))?;

        if self.is_cold(query_index) {
            return Ok(Vec::new());
        }

        let query = self.matrix.item_postings(query_index);
        let score_candidate = |index: usize| -> Option<Neighbor> {
            if index == query_index || self.is_cold(index) {
                return None;
            }
            let score = self
                .metric
                .score_sparse(query, self.matrix.item_postings(index))?;
            self.keeps(score)
                .then(|| Neighbor::new(self.matrix.item_id_at(index).to_string(), score))
        };

        let item_count = self.matrix.item_count();
        let neighbors: Vec<Neighbor> = if item_count < PARALLEL_THRESHOLD {
            (0..item_count).filter_map(score_candidate).collect()
        } else {
            (0..item_count)
                .into_par_iter()
                .filter_map(score_candidate)
                .collect()
        };

        Ok(rank_neighbors(neighbors, k))
    }

    /// Score a single pair of items.
    ///
    /// Returns `None` when either item is unknown or cold, or when the
    /// pair has no co-rating users.
    pub fn score_pair(&self, a: &str, b: &str) -> Option<f32> {
        let index_a = self.matrix.item_index(a)?;
        let index_b = self.matrix.item_index(b)?;
        if self.is_cold(index_a) || self.is_cold(index_b) {
            return None;
        }
        self.metric.score_sparse(
            self.matrix.item_postings(index_a),
            self.matrix.item_postings(index_b),
        )
    }

    /// Get the items a user has rated, with their ratings.
    pub fn rated_items(&self, user_id: &str) -> Result<Vec<(String, f32)>> {
        let user_index = self
            .matrix
            .user_index(user_id)
            .ok_or_else(|| BiblosError::unknown_user(user_id))?;

        Ok(self
            .matrix
            .user_postings(user_index)
            .iter()
            .map(|&(item_index, rating)| {
                (self.matrix.item_id_at(item_index as usize).to_string(), rating)
            })
            .collect())
    }

    /// Rating-weighted mean similarity between a user's rated items and
    /// one candidate.
    fn score_for_postings(&self, rated: &[(u32, f32)], candidate_index: usize) -> Option<f32> {
        let candidate = self.matrix.item_postings(candidate_index);
        let mut weighted = 0.0_f32;
        let mut weight_total = 0.0_f32;

        for &(item_index, rating) in rated {
            let item_index = item_index as usize;
            if self.is_cold(item_index) {
                continue;
            }
            if let Some(similarity) = self
                .metric
                .score_sparse(self.matrix.item_postings(item_index), candidate)
            {
                weighted += rating * similarity;
                weight_total += rating.abs();
            }
        }

        if weight_total == 0.0 {
            return None;
        }
        Some(weighted / weight_total)
    }

    /// Find the `k` best unrated items for a user.
    ///
    /// Each candidate is scored by the rating-weighted mean similarity
    /// to the user's rated items. Items the user already rated are
    /// excluded.
    pub fn similar_for_user(&self, user_id: &str, k: usize) -> Result<Vec<Neighbor>> {
        let user_index = self
            .matrix
            .user_index(user_id)
            .ok_or_else(|| BiblosError::unknown_user(user_id))?;
        let rated = self.matrix.user_postings(user_index);

        let score_candidate = |index: usize| -> Option<Neighbor> {
            if self.is_cold(index) {
                return None;
            }
            if rated.binary_search_by_key(&(index as u32), |&(i, _)| i).is_ok() {
                return None;
            }
            let score = self.score_for_postings(rated, index)?;
            self.keeps(score)
                .then(|| Neighbor::new(self.matrix.item_id_at(index).to_string(), score))
        };

        let item_count = self.matrix.item_count();
        let neighbors: Vec<Neighbor> = if item_count < PARALLEL_THRESHOLD {
            (0..item_count).filter_map(score_candidate).collect()
        } else {
            (0..item_count)
                .into_par_iter()
                .filter_map(score_candidate)
                .collect()
        };

        Ok(rank_neighbors(neighbors, k))
    }

    /// Score one candidate item for a user.
    ///
    /// Returns `None` when the user or item is unknown, the item is
    /// cold, or no rated item shares a co-rater with the candidate.
    pub fn user_item_score(&self, user_id: &str, item_id: &str) -> Option<f32> {
        let user_index = self.matrix.user_index(user_id)?;
        let item_index = self.matrix.item_index(item_id)?;
        if self.is_cold(item_index) {
            return None;
        }
        self.score_for_postings(self.matrix.user_postings(user_index), item_index)
    }

    /// Get the similarity metric this model was fitted with.
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Get the underlying interaction matrix.
    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }
}
