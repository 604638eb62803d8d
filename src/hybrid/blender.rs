//! Weighted blending of content and collaborative candidates.
//!
//! Each side contributes a candidate pool larger than `k`, so an item
//! that is strong on only one side still surfaces in the blend. Pools
//! are unioned by item id; a candidate missing from one side takes 0
//! for that side's contribution rather than failing the merge.

use ahash::{AHashMap, AHashSet};

use crate::collaborative::CollaborativeModel;
use crate::content::ContentModel;
use crate::error::{BiblosError, Result};
use crate::hybrid::types::BlendWeights;
use crate::similarity::{Neighbor, rank_neighbors};

/// Blends candidate pools from both models into one ranked list.
pub struct HybridRecommender<'a> {
    content: &'a ContentModel,
    collaborative: &'a CollaborativeModel,
    content_weight: f32,
    collaborative_weight: f32,
    pool_multiplier: usize,
}

impl<'a> HybridRecommender<'a> {
    /// Create a recommender over two fitted models.
    ///
    /// Weights are normalized up front; invalid weights are rejected
    /// here rather than at query time.
    pub fn new(
        content: &'a ContentModel,
        collaborative: &'a CollaborativeModel,
        weights: BlendWeights,
        pool_multiplier: usize,
    ) -> Result<Self> {
        let (content_weight, collaborative_weight) = weights.normalized()?;
        Ok(Self {
            content,
            collaborative,
            content_weight,
            collaborative_weight,
            pool_multiplier,
        })
    }

    fn pool_size(&self, k: usize) -> usize {
        k.saturating_mul(self.pool_multiplier).max(k)
    }

    /// Recommend `k` items similar to a seed item.
    ///
    /// Fails with [`BiblosError::UnknownItem`] when the seed is in
    /// neither model.
    pub fn recommend_for_item(&self, item_id: &str, k: usize) -> Result<Vec<Neighbor>> {
        let in_content = self.content.contains(item_id);
        let in_collaborative = self.collaborative.matrix().item_index(item_id).is_some();
        if !in_content && !in_collaborative {
            return Err(BiblosError::unknown_item(item_id));
        }

        let pool = self.pool_size(k);
        let content_pool = if self.content_weight > 0.0 && in_content {
            self.content.similar(item_id, pool)?
        } else {
            Vec::new()
        };
        let collaborative_pool = if self.collaborative_weight > 0.0 && in_collaborative {
            self.collaborative.similar(item_id, pool)?
        } else {
            Vec::new()
        };

        Ok(self.blend(content_pool, collaborative_pool, k))
    }

    /// Recommend `k` items for a user, based on everything they rated.
    ///
    /// The content side scores candidates against a rating-weighted
    /// profile of the user's rated items; the collaborative side scores
    /// them by rating-weighted similarity to those items. Already-rated
    /// items never appear in the result.
    pub fn recommend_for_user(&self, user_id: &str, k: usize) -> Result<Vec<Neighbor>> {
        let rated = self.collaborative.rated_items(user_id)?;
        let exclude: AHashSet<String> = rated.iter().map(|(id, _)| id.clone()).collect();

        let pool = self.pool_size(k);
        let content_pool = if self.content_weight > 0.0 {
            let profile = self.content.profile_of(&rated)?;
            self.content.similar_to_profile(&profile, pool, &exclude)?
        } else {
            Vec::new()
        };
        let collaborative_pool = if self.collaborative_weight > 0.0 {
            self.collaborative.similar_for_user(user_id, pool)?
        } else {
            Vec::new()
        };

        Ok(self.blend(content_pool, collaborative_pool, k))
    }

    /// Union the pools by item id, blend, rank, and truncate.
    fn blend(
        &self,
        content_pool: Vec<Neighbor>,
        collaborative_pool: Vec<Neighbor>,
        k: usize,
    ) -> Vec<Neighbor> {
        let mut merged: AHashMap<String, (Option<f32>, Option<f32>)> = AHashMap::new();

        for neighbor in content_pool {
            merged.entry(neighbor.item_id).or_insert((None, None)).0 = Some(neighbor.score);
        }
        for neighbor in collaborative_pool {
            merged.entry(neighbor.item_id).or_insert((None, None)).1 = Some(neighbor.score);
        }

        let neighbors: Vec<Neighbor> = merged
            .into_iter()
            .filter_map(|(item_id, (content, collaborative))| {
                let blended = self.content_weight * content.unwrap_or(0.0)
                    + self.collaborative_weight * collaborative.unwrap_or(0.0);
                (blended > 0.0).then(|| Neighbor::new(item_id, blended))
            })
            .collect();

        rank_neighbors(neighbors, k)
    }
}
