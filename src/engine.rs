//! The recommendation engine façade.
//!
//! [`Engine`] ties the pipeline together: `train` ingests a catalog and
//! interactions and fits both models, `save`/`load` persist the result
//! through a [`Storage`] backend, and `recommend` answers queries
//! against the trained state.
//!
//! # Examples
//!
//! ```
//! use biblos::catalog::{Interaction, Item};
//! use biblos::engine::{Engine, Query};
//! use biblos::hybrid::Method;
//!
//! # fn main() -> biblos::error::Result<()> {
//! let items = vec![
//!     Item::new("B1", "Dune").with_description("desert planet spice empire"),
//!     Item::new("B2", "Foundation").with_description("galactic empire psychohistory"),
//!     Item::new("B3", "Cooking 101").with_description("recipes kitchen butter"),
//! ];
//! let interactions = vec![
//!     Interaction::new("u1", "B1", 5.0),
//!     Interaction::new("u1", "B2", 4.5),
//!     Interaction::new("u2", "B1", 4.0),
//!     Interaction::new("u2", "B2", 4.0),
//! ];
//!
//! let mut engine = Engine::new();
//! engine.train(items, interactions)?;
//!
//! let results = engine.recommend(&Query::id("B1"), Method::Hybrid, 2)?;
//! assert_eq!(results[0].item_id, "B2");
//! # Ok(())
//! # }
//! ```

use std::time::Instant;

use tracing::info;

use crate::artifact::{self, TrainedArtifact};
use crate::catalog::{Catalog, CatalogSnapshot, Interaction, Item};
use crate::collaborative::CollaborativeModel;
use crate::config::EngineConfig;
use crate::content::ContentModel;
use crate::error::{BiblosError, Result};
use crate::hybrid::{BlendWeights, HybridRecommender, Method, Recommendation, RecommendationSource};
use crate::storage::Storage;

/// How to select the seed for a recommendation query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Seed by catalog item id.
    Id(String),
    /// Seed by exact title, case-insensitive, optionally narrowed by
    /// author.
    Title {
        /// The title to match.
        title: String,
        /// Optional author to disambiguate identical titles.
        author: Option<String>,
    },
    /// Seed by everything a user has rated.
    User(String),
}

impl Query {
    /// Query by item id.
    pub fn id<S: Into<String>>(item_id: S) -> Self {
        Query::Id(item_id.into())
    }

    /// Query by title.
    pub fn title<S: Into<String>>(title: S) -> Self {
        Query::Title {
            title: title.into(),
            author: None,
        }
    }

    /// Query by title, narrowed by author.
    pub fn title_by<T: Into<String>, A: Into<String>>(title: T, author: A) -> Self {
        Query::Title {
            title: title.into(),
            author: Some(author.into()),
        }
    }

    /// Query by user id.
    pub fn user<S: Into<String>>(user_id: S) -> Self {
        Query::User(user_id.into())
    }
}

enum EngineState {
    Uninitialized,
    Trained(Box<TrainedArtifact>),
}

/// Hybrid book recommendation engine.
pub struct Engine {
    config: EngineConfig,
    state: EngineState,
}

impl Engine {
    /// Create an untrained engine with the default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            state: EngineState::Uninitialized,
        }
    }

    /// Create an untrained engine with a custom configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: EngineState::Uninitialized,
        })
    }

    /// Whether the engine holds a trained artifact.
    pub fn is_trained(&self) -> bool {
        matches!(self.state, EngineState::Trained(_))
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the trained artifact.
    pub fn artifact(&self) -> Result<&TrainedArtifact> {
        match &self.state {
            EngineState::Trained(artifact) => Ok(artifact),
            EngineState::Uninitialized => Err(BiblosError::NotTrained),
        }
    }

    /// Fit both models over a catalog and interaction history.
    ///
    /// Invalid item records and interactions are skipped with warnings;
    /// training fails only when no valid catalog items remain.
    /// Retraining replaces the previous state wholesale.
    pub fn train<C, I>(&mut self, items: C, interactions: I) -> Result<()>
    where
        C: IntoIterator<Item = Item>,
        I: IntoIterator<Item = Interaction>,
    {
        let started = Instant::now();
        let interactions: Vec<Interaction> = interactions.into_iter().collect();

        let catalog = Catalog::from_items(items)?;
        let snapshot = CatalogSnapshot::from_catalog(&catalog);
        let content = ContentModel::fit(&catalog, &self.config.content)?;
        let collaborative =
            CollaborativeModel::fit(&interactions, &catalog, &self.config.collaborative);

        let artifact = TrainedArtifact::new(snapshot, content, collaborative);
        info!(
            items = artifact.metadata.item_count,
            users = artifact.metadata.user_count,
            interactions = artifact.metadata.interaction_count,
            vocabulary = artifact.metadata.vocabulary_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "trained engine"
        );

        self.state = EngineState::Trained(Box::new(artifact));
        Ok(())
    }

    /// Persist the trained state under `name`.
    pub fn save(&self, storage: &dyn Storage, name: &str) -> Result<()> {
        artifact::save(self.artifact()?, storage, name)
    }

    /// Restore trained state from a saved artifact.
    ///
    /// Loading never re-derives models; the engine serves exactly what
    /// was saved. Allowed from any state, replacing what was there.
    pub fn load(&mut self, storage: &dyn Storage, name: &str) -> Result<()> {
        let artifact = artifact::load(storage, name)?;
        self.state = EngineState::Trained(Box::new(artifact));
        Ok(())
    }

    /// Recommend `k` items for a query using the given method.
    pub fn recommend(
        &self,
        query: &Query,
        method: Method,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        let weights = method.weights(&self.config.hybrid);
        self.recommend_inner(query, weights, method.into(), k)
    }

    /// Recommend `k` items with explicit blend weights.
    ///
    /// Weights need not sum to 1; they are normalized. Results are
    /// tagged with the hybrid source.
    pub fn recommend_weighted(
        &self,
        query: &Query,
        weights: BlendWeights,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        self.recommend_inner(query, weights, RecommendationSource::Hybrid, k)
    }

    fn recommend_inner(
        &self,
        query: &Query,
        weights: BlendWeights,
        source: RecommendationSource,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        let artifact = self.artifact()?;
        let recommender = HybridRecommender::new(
            &artifact.content,
            &artifact.collaborative,
            weights,
            self.config.hybrid.pool_multiplier,
        )?;

        let neighbors = match query {
            Query::Id(item_id) => recommender.recommend_for_item(item_id, k)?,
            Query::Title { title, author } => {
                let item_id = artifact.snapshot.resolve_title(title, author.as_deref())?;
                recommender.recommend_for_item(item_id, k)?
            }
            Query::User(user_id) => recommender.recommend_for_user(user_id, k)?,
        };

        Ok(neighbors
            .into_iter()
            .map(|neighbor| {
                let title = artifact
                    .snapshot
                    .title_of(&neighbor.item_id)
                    .unwrap_or_default()
                    .to_string();
                Recommendation::new(neighbor.item_id, title, neighbor.score, source)
            })
            .collect())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_engine() -> Engine {
        let items = vec![
            Item::new("B1", "Dune")
                .with_author("Frank Herbert")
                .with_description("desert planet spice galactic empire politics"),
            Item::new("B2", "Foundation")
                .with_author("Isaac Asimov")
                .with_description("galactic empire psychohistory politics"),
            Item::new("B3", "Cooking 101").with_description("recipes kitchen butter"),
        ];
        let interactions = vec![
            Interaction::new("u1", "B1", 5.0),
            Interaction::new("u1", "B2", 4.5),
            Interaction::new("u2", "B1", 4.0),
            Interaction::new("u2", "B2", 4.0),
        ];

        let mut engine = Engine::new();
        engine.train(items, interactions).unwrap();
        engine
    }

    #[test]
    fn test_untrained_engine_refuses_queries() {
        let engine = Engine::new();
        assert!(!engine.is_trained());

        let result = engine.recommend(&Query::id("B1"), Method::Hybrid, 5);
        assert!(matches!(result, Err(BiblosError::NotTrained)));
        assert!(matches!(engine.artifact(), Err(BiblosError::NotTrained)));
    }

    #[test]
    fn test_recommend_by_id() {
        let engine = trained_engine();
        let results = engine.recommend(&Query::id("B1"), Method::Hybrid, 2).unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].item_id, "B2");
        assert_eq!(results[0].title, "Foundation");
        assert_eq!(results[0].source, RecommendationSource::Hybrid);
    }

    #[test]
    fn test_recommend_by_title_is_case_insensitive() {
        let engine = trained_engine();

        let by_id = engine.recommend(&Query::id("B1"), Method::Content, 2).unwrap();
        let by_title = engine
            .recommend(&Query::title("dune"), Method::Content, 2)
            .unwrap();
        assert_eq!(by_id, by_title);

        let narrowed = engine
            .recommend(&Query::title_by("DUNE", "frank herbert"), Method::Content, 2)
            .unwrap();
        assert_eq!(by_id, narrowed);
    }

    #[test]
    fn test_recommend_unknown_title() {
        let engine = trained_engine();
        let result = engine.recommend(&Query::title("Nonexistent"), Method::Hybrid, 2);
        assert!(matches!(result, Err(BiblosError::UnknownItem(_))));
    }

    #[test]
    fn test_retrain_replaces_state() {
        let mut engine = trained_engine();

        let items = vec![
            Item::new("X1", "Gardening").with_description("plants soil seasons"),
            Item::new("X2", "Botany").with_description("plants taxonomy species"),
        ];
        engine.train(items, Vec::new()).unwrap();

        // The old catalog is gone.
        let result = engine.recommend(&Query::id("B1"), Method::Content, 2);
        assert!(matches!(result, Err(BiblosError::UnknownItem(_))));

        let results = engine.recommend(&Query::id("X1"), Method::Content, 2).unwrap();
        assert_eq!(results[0].item_id, "X2");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default().with_weights(-1.0, 0.5);
        assert!(Engine::with_config(config).is_err());
    }

    #[test]
    fn test_recommend_weighted_normalizes() {
        let engine = trained_engine();

        let balanced = engine
            .recommend_weighted(&Query::id("B1"), BlendWeights::new(0.5, 0.5), 2)
            .unwrap();
        let scaled = engine
            .recommend_weighted(&Query::id("B1"), BlendWeights::new(5.0, 5.0), 2)
            .unwrap();
        assert_eq!(balanced, scaled);
    }
}
