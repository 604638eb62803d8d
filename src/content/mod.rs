//! Content-based similarity over TF-IDF vectors.
//!
//! Catalog items are analyzed into bags of terms, weighted by TF-IDF
//! over a corpus-wide [`Vocabulary`], and compared with cosine
//! similarity. Two books score high when their metadata shares
//! distinctive terms, regardless of who has rated them.

pub mod model;
pub mod vectorizer;
pub mod vocabulary;

pub use model::ContentModel;
pub use vectorizer::TfIdfVectorizer;
pub use vocabulary::{TermStats, Vocabulary};
