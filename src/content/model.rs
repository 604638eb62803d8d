//! Fitted content-based similarity model.
//!
//! A [`ContentModel`] holds the vocabulary and one TF-IDF vector per
//! catalog item, keyed by item id in ascending order so lookups are a
//! binary search and rankings are reproducible. Once fitted it needs no
//! analyzer: every query is resolved against the stored vectors.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::ContentConfig;
use crate::content::vectorizer::TfIdfVectorizer;
use crate::content::vocabulary::Vocabulary;
use crate::error::{BiblosError, Result};
use crate::similarity::{Neighbor, Vector, batch_cosine, cosine, rank_neighbors};

/// Content-based similarity model over TF-IDF vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentModel {
    /// Vocabulary shared by all item vectors.
    vocabulary: Vocabulary,
    /// Item ids in ascending order.
    item_ids: Vec<String>,
    /// TF-IDF vectors, parallel to `item_ids`.
    vectors: Vec<Vector>,
}

impl ContentModel {
    /// Fit a content model over the catalog.
    ///
    /// Every item gets a vector, including items whose text analyzes to
    /// nothing; those become zero vectors and never score above 0.
    pub fn fit(catalog: &Catalog, config: &ContentConfig) -> Result<Self> {
        let mut entries: Vec<(String, String)> = catalog
            .iter()
            .map(|item| (item.item_id.clone(), item.document_text()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let item_ids: Vec<String> = entries.iter().map(|(id, _)| id.clone()).collect();
        let documents: Vec<String> = entries.into_iter().map(|(_, text)| text).collect();

        let vectorizer = TfIdfVectorizer::new(config.clone());
        let (vocabulary, vectors) = vectorizer.fit_transform(&documents)?;

        Ok(Self {
            vocabulary,
            item_ids,
            vectors,
        })
    }

    fn index_of(&self, item_id: &str) -> Option<usize> {
        self.item_ids
            .binary_search_by(|id| id.as_str().cmp(item_id))
            .ok()
    }

    /// Check whether an item is in the model.
    pub fn contains(&self, item_id: &str) -> bool {
        self.index_of(item_id).is_some()
    }

    /// Get the stored vector for an item.
    pub fn vector_of(&self, item_id: &str) -> Option<&Vector> {
        self.index_of(item_id).map(|i| &self.vectors[i])
    }

    /// Find the `k` most similar items to the given item.
    ///
    /// The query item never appears in its own results, and items with
    /// no similarity signal (score 0) are omitted. Results are ordered
    /// by descending score with ties broken by ascending item id.
    pub fn similar(&self, item_id: &str, k: usize) -> Result<Vec<Neighbor>> {
        let query_index = self
            .index_of(item_id)
            .ok_or_else(|| BiblosError::unknown_item(item_id))?;

        let scores = batch_cosine(&self.vectors[query_index].data, &self.vectors)?;
        let neighbors: Vec<Neighbor> = scores
            .into_iter()
            .enumerate()
            .filter(|&(index, score)| index != query_index && score > 0.0)
            .map(|(index, score)| Neighbor::new(self.item_ids[index].clone(), score))
            .collect();

        Ok(rank_neighbors(neighbors, k))
    }

    /// Score a single pair of items.
    ///
    /// Returns `None` when either item is unknown to the model. Known
    /// pairs always score, even when the score is 0.
    pub fn score_pair(&self, a: &str, b: &str) -> Option<f32> {
        let va = self.vector_of(a)?;
        let vb = self.vector_of(b)?;
        cosine(&va.data, &vb.data).ok()
    }

    /// Build a rating-weighted taste profile from a user's rated items.
    ///
    /// Items unknown to the model are skipped. The profile is left
    /// unnormalized; cosine scoring is magnitude-invariant.
    pub fn profile_of(&self, rated: &[(String, f32)]) -> Result<Vector> {
        let mut profile = Vector::zeros(self.dimension());
        for (item_id, rating) in rated {
            if let Some(vector) = self.vector_of(item_id) {
                profile.add_scaled(vector, *rating)?;
            }
        }
        Ok(profile)
    }

    /// Find the `k` items most similar to a taste profile.
    ///
    /// Items in `exclude` are omitted, as are items with no similarity
    /// signal.
    pub fn similar_to_profile(
        &self,
        profile: &Vector,
        k: usize,
        exclude: &AHashSet<String>,
    ) -> Result<Vec<Neighbor>> {
        let scores = batch_cosine(&profile.data, &self.vectors)?;
        let neighbors: Vec<Neighbor> = scores
            .into_iter()
            .enumerate()
            .filter(|&(index, score)| score > 0.0 && !exclude.contains(&self.item_ids[index]))
            .map(|(index, score)| Neighbor::new(self.item_ids[index].clone(), score))
            .collect();

        Ok(rank_neighbors(neighbors, k))
    }

    /// Score a taste profile against a single item.
    pub fn profile_score(&self, profile: &Vector, item_id: &str) -> Option<f32> {
        let vector = self.vector_of(item_id)?;
        cosine(&profile.data, &vector.data).ok()
    }

    /// Get the dimensionality of the vector space.
    pub fn dimension(&self) -> usize {
        self.vocabulary.size()
    }

    /// Get the number of items in the model.
    pub fn item_count(&self) -> usize {
        self.item_ids.len()
    }

    /// Get the fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}
