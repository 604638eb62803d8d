//! Sparse user-item interaction matrix.
//!
//! Ratings are stored as sorted postings along both axes: for each item
//! the `(user_index, rating)` pairs of the users who rated it, and for
//! each user the `(item_index, rating)` pairs of the items they rated.
//! A user who has not rated an item is simply absent from its postings;
//! absence is never treated as a zero rating.
//!
//! The item axis covers the whole catalog, so an item with no ratings
//! has empty postings rather than being missing. The user axis covers
//! only users that appear in the kept interactions.

use serde::{Deserialize, Serialize};
use tracing::warn;

use ahash::AHashMap;

use crate::catalog::{Catalog, Interaction};

/// Sparse rating matrix with postings along both axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionMatrix {
    /// User ids in ascending order.
    user_ids: Vec<String>,
    /// Item ids in ascending order, covering the whole catalog.
    item_ids: Vec<String>,
    /// Per item: `(user_index, rating)` sorted by user index.
    item_postings: Vec<Vec<(u32, f32)>>,
    /// Per user: `(item_index, rating)` sorted by item index.
    user_postings: Vec<Vec<(u32, f32)>>,
    /// Number of interaction records skipped during the build.
    skipped: usize,
}

impl InteractionMatrix {
    /// Build a matrix from raw interactions against a catalog.
    ///
    /// Records with an empty user or item id, a non-finite rating, or
    /// an item id missing from the catalog are skipped with a warning.
    /// When a user rates the same item more than once, the last record
    /// wins.
    pub fn build(interactions: &[Interaction], catalog: &Catalog) -> Self {
        let mut ratings: AHashMap<(String, String), f32> = AHashMap::new();
        let mut skipped = 0usize;

        for interaction in interactions {
            let user_id = interaction.user_id.trim();
            let item_id = interaction.item_id.trim();

            if user_id.is_empty() || item_id.is_empty() {
                warn!("skipping interaction with empty user or item id");
                skipped += 1;
                continue;
            }
            if !interaction.rating.is_finite() {
                warn!(user_id, item_id, "skipping interaction with non-finite rating");
                skipped += 1;
                continue;
            }
            if !catalog.contains(item_id) {
                warn!(user_id, item_id, "skipping interaction for unknown item");
                skipped += 1;
                continue;
            }

            ratings.insert((user_id.to_string(), item_id.to_string()), interaction.rating);
        }

        let mut user_ids: Vec<String> = ratings.keys().map(|(user, _)| user.clone()).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut item_ids: Vec<String> =
            catalog.iter().map(|item| item.item_id.clone()).collect();
        item_ids.sort_unstable();

        let mut item_postings: Vec<Vec<(u32, f32)>> = vec![Vec::new(); item_ids.len()];
        let mut user_postings: Vec<Vec<(u32, f32)>> = vec![Vec::new(); user_ids.len()];

        for ((user, item), rating) in &ratings {
            // Both lookups succeed: the axes were built from these keys.
            let Ok(user_index) = user_ids.binary_search(user) else {
                continue;
            };
            let Ok(item_index) = item_ids.binary_search(item) else {
                continue;
            };
            item_postings[item_index].push((user_index as u32, *rating));
            user_postings[user_index].push((item_index as u32, *rating));
        }

        for postings in &mut item_postings {
            postings.sort_unstable_by_key(|&(index, _)| index);
        }
        for postings in &mut user_postings {
            postings.sort_unstable_by_key(|&(index, _)| index);
        }

        Self {
            user_ids,
            item_ids,
            item_postings,
            user_postings,
            skipped,
        }
    }

    /// Get the item index for an id.
    pub fn item_index(&self, item_id: &str) -> Option<usize> {
        self.item_ids
            .binary_search_by(|id| id.as_str().cmp(item_id))
            .ok()
    }

    /// Get the user index for an id.
    pub fn user_index(&self, user_id: &str) -> Option<usize> {
        self.user_ids
            .binary_search_by(|id| id.as_str().cmp(user_id))
            .ok()
    }

    /// Get the item id at an index.
    pub fn item_id_at(&self, index: usize) -> &str {
        &self.item_ids[index]
    }

    /// Get the rating postings for an item.
    pub fn item_postings(&self, index: usize) -> &[(u32, f32)] {
        &self.item_postings[index]
    }

    /// Get the rating postings for a user.
    pub fn user_postings(&self, index: usize) -> &[(u32, f32)] {
        &self.user_postings[index]
    }

    /// Number of users who rated the item at `index`.
    pub fn rating_count(&self, index: usize) -> usize {
        self.item_postings[index].len()
    }

    /// Number of items on the item axis.
    pub fn item_count(&self) -> usize {
        self.item_ids.len()
    }

    /// Number of users on the user axis.
    pub fn user_count(&self) -> usize {
        self.user_ids.len()
    }

    /// Total number of kept interactions.
    pub fn interaction_count(&self) -> usize {
        self.item_postings.iter().map(Vec::len).sum()
    }

    /// Number of interaction records skipped during the build.
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;

    fn small_catalog() -> Catalog {
        Catalog::from_items(vec![
            Item::new("B1", "Dune"),
            Item::new("B2", "Foundation"),
            Item::new("B3", "Cooking"),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_postings_both_axes() {
        let catalog = small_catalog();
        let interactions = vec![
            Interaction::new("u1", "B1", 5.0),
            Interaction::new("u1", "B2", 4.0),
            Interaction::new("u2", "B1", 3.0),
        ];
        let matrix = InteractionMatrix::build(&interactions, &catalog);

        assert_eq!(matrix.user_count(), 2);
        assert_eq!(matrix.item_count(), 3);
        assert_eq!(matrix.interaction_count(), 3);
        assert_eq!(matrix.skipped_records(), 0);

        let b1 = matrix.item_index("B1").unwrap();
        assert_eq!(matrix.item_postings(b1), &[(0, 5.0), (1, 3.0)]);

        // B3 exists on the axis with no ratings.
        let b3 = matrix.item_index("B3").unwrap();
        assert!(matrix.item_postings(b3).is_empty());

        let u1 = matrix.user_index("u1").unwrap();
        assert_eq!(matrix.user_postings(u1), &[(0, 5.0), (1, 4.0)]);
    }

    #[test]
    fn test_build_skips_invalid_records() {
        let catalog = small_catalog();
        let interactions = vec![
            Interaction::new("u1", "B1", 5.0),
            Interaction::new("", "B1", 4.0),
            Interaction::new("u2", "  ", 4.0),
            Interaction::new("u2", "B9", 4.0),
            Interaction::new("u2", "B2", f32::NAN),
        ];
        let matrix = InteractionMatrix::build(&interactions, &catalog);

        assert_eq!(matrix.interaction_count(), 1);
        assert_eq!(matrix.skipped_records(), 4);
        // u2 contributed no valid interactions, so the user axis has
        // only u1.
        assert_eq!(matrix.user_count(), 1);
    }

    #[test]
    fn test_duplicate_rating_last_wins() {
        let catalog = small_catalog();
        let interactions = vec![
            Interaction::new("u1", "B1", 2.0),
            Interaction::new("u1", "B1", 5.0),
        ];
        let matrix = InteractionMatrix::build(&interactions, &catalog);

        assert_eq!(matrix.interaction_count(), 1);
        let b1 = matrix.item_index("B1").unwrap();
        assert_eq!(matrix.item_postings(b1), &[(0, 5.0)]);
    }

    #[test]
    fn test_empty_interactions_allowed() {
        let catalog = small_catalog();
        let matrix = InteractionMatrix::build(&[], &catalog);

        assert_eq!(matrix.user_count(), 0);
        assert_eq!(matrix.item_count(), 3);
        assert_eq!(matrix.interaction_count(), 0);
        assert!(matrix.item_index("B1").is_some());
        assert!(matrix.user_index("u1").is_none());
    }
}
