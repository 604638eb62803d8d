//! Collaborative filtering over user-item interactions.
//!
//! The signal here is behavioral rather than textual: items are close
//! when the same users rated them similarly. This finds relationships
//! the metadata never states, at the cost of needing enough ratings to
//! say anything at all.

pub mod matrix;
pub mod model;

pub use matrix::InteractionMatrix;
pub use model::CollaborativeModel;
