//! Hybrid recommendation: blending content and collaborative signals.
//!
//! Content similarity works from day one but only sees metadata;
//! collaborative filtering finds hidden relationships but needs rating
//! volume. The [`HybridRecommender`] takes weighted candidate pools
//! from both and produces a single deterministic ranking.

pub mod blender;
pub mod types;

pub use blender::HybridRecommender;
pub use types::{BlendWeights, Method, Recommendation, RecommendationSource};
