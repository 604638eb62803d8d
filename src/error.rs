//! Error types for the Biblos library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`BiblosError`] enum. Per-record ingestion problems are reported as
//! [`BiblosError::InvalidRecord`]; query-time lookup failures as
//! [`BiblosError::UnknownItem`] / [`BiblosError::UnknownUser`] /
//! [`BiblosError::AmbiguousTitle`]; persistence integrity failures as
//! [`BiblosError::IncompatibleVersion`] / [`BiblosError::CorruptArtifact`].
//!
//! An empty recommendation list is never an error. Models return
//! `Ok(vec![])` when there are legitimately no candidates (for example a
//! cold-start item used as a query target).
//!
//! # Examples
//!
//! ```
//! use biblos::error::{BiblosError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(BiblosError::unknown_item("B42"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A catalog entry that matched an ambiguous title query.
///
/// Returned inside [`BiblosError::AmbiguousTitle`] so callers can present
/// the choices (or retry with an author disambiguator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCandidate {
    /// Stable identifier of the matching item.
    pub item_id: String,
    /// Title as stored in the catalog.
    pub title: String,
    /// Author as stored in the catalog.
    pub author: String,
}

/// The main error type for Biblos operations.
#[derive(Error, Debug)]
pub enum BiblosError {
    /// A malformed record was encountered during ingestion. Fatal to the
    /// record, and to `train` only when the whole catalog is empty afterward.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The query target could not be resolved to a known item.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The query target user never appeared in the interaction source.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// A title query matched more than one catalog entry.
    #[error("ambiguous title \"{title}\": {} candidates", .candidates.len())]
    AmbiguousTitle {
        /// The title as given in the query.
        title: String,
        /// All catalog entries sharing that title.
        candidates: Vec<TitleCandidate>,
    },

    /// An operation that requires fitted models was attempted before
    /// `train` or `load`.
    #[error("engine is not trained")]
    NotTrained,

    /// A persisted artifact carries a format version this build cannot read.
    #[error("incompatible artifact version: found {found}, expected {expected}")]
    IncompatibleVersion {
        /// Version tag found in the artifact.
        found: u32,
        /// Version tag this build writes and reads.
        expected: u32,
    },

    /// A persisted artifact is missing required sections or is malformed.
    #[error("corrupt artifact: {0}")]
    CorruptArtifact(String),

    /// Blend weights were non-finite, negative, or summed to zero.
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two vectors of different dimensions were compared.
    #[error("vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dimension of the left-hand vector.
        expected: usize,
        /// Dimension of the right-hand vector.
        found: usize,
    },

    /// Storage backend errors (missing files, closed storage, etc.)
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error while encoding an artifact.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with [`BiblosError`].
pub type Result<T> = std::result::Result<T, BiblosError>;

impl BiblosError {
    /// Create a new invalid record error.
    pub fn invalid_record<S: Into<String>>(msg: S) -> Self {
        BiblosError::InvalidRecord(msg.into())
    }

    /// Create a new unknown item error.
    pub fn unknown_item<S: Into<String>>(item_id: S) -> Self {
        BiblosError::UnknownItem(item_id.into())
    }

    /// Create a new unknown user error.
    pub fn unknown_user<S: Into<String>>(user_id: S) -> Self {
        BiblosError::UnknownUser(user_id.into())
    }

    /// Create a new corrupt artifact error.
    pub fn corrupt_artifact<S: Into<String>>(msg: S) -> Self {
        BiblosError::CorruptArtifact(msg.into())
    }

    /// Create a new invalid weights error.
    pub fn invalid_weights<S: Into<String>>(msg: S) -> Self {
        BiblosError::InvalidWeights(msg.into())
    }

    /// Create a new invalid configuration error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        BiblosError::InvalidConfig(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        BiblosError::Storage(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        BiblosError::Serialization(msg.into())
    }
}

impl From<bincode::Error> for BiblosError {
    fn from(err: bincode::Error) -> Self {
        BiblosError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = BiblosError::unknown_item("B42");
        assert_eq!(error.to_string(), "unknown item: B42");

        let error = BiblosError::invalid_record("rating is not finite");
        assert_eq!(error.to_string(), "invalid record: rating is not finite");

        let error = BiblosError::corrupt_artifact("checksum mismatch");
        assert_eq!(error.to_string(), "corrupt artifact: checksum mismatch");
    }

    #[test]
    fn test_ambiguous_title_display() {
        let error = BiblosError::AmbiguousTitle {
            title: "Dune".to_string(),
            candidates: vec![
                TitleCandidate {
                    item_id: "B1".to_string(),
                    title: "Dune".to_string(),
                    author: "Frank Herbert".to_string(),
                },
                TitleCandidate {
                    item_id: "B7".to_string(),
                    title: "Dune".to_string(),
                    author: "Someone Else".to_string(),
                },
            ],
        };
        assert_eq!(error.to_string(), "ambiguous title \"Dune\": 2 candidates");
    }

    #[test]
    fn test_version_mismatch_display() {
        let error = BiblosError::IncompatibleVersion {
            found: 9,
            expected: 1,
        };
        assert_eq!(
            error.to_string(),
            "incompatible artifact version: found 9, expected 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let biblos_error = BiblosError::from(io_error);

        match biblos_error {
            BiblosError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
