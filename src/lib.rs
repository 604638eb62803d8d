//! # Biblos
//!
//! A hybrid book recommendation engine combining content-based and
//! collaborative filtering.
//!
//! ## Features
//!
//! - TF-IDF content similarity over book metadata
//! - Item-item collaborative filtering over user ratings
//! - Weighted blending of both signals into one deterministic ranking
//! - Versioned, checksummed model persistence with atomic replacement
//! - Pluggable storage backends (filesystem and in-memory)
//!
//! ## Quick start
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
//!     Interaction::new("u1", "B2", 4.0),
//!     Interaction::new("u2", "B1", 4.5),
//!     Interaction::new("u2", "B2", 5.0),
//! ];
//!
//! let mut engine = Engine::new();
//! engine.train(items, interactions)?;
//!
//! let picks = engine.recommend(&Query::id("B1"), Method::Hybrid, 2)?;
//! assert_eq!(picks[0].item_id, "B2");
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod artifact;
pub mod catalog;
pub mod collaborative;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod hybrid;
pub mod similarity;
pub mod storage;

pub use catalog::{Interaction, Item};
pub use config::EngineConfig;
pub use engine::{Engine, Query};
pub use error::{BiblosError, Result};
pub use hybrid::{BlendWeights, Method, Recommendation, RecommendationSource};
pub use similarity::SimilarityMetric;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
