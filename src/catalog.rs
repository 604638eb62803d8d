//! Catalog store: the shared item table all models index into.
//!
//! Items are keyed by a stable `item_id`. Titles are a user-facing alias
//! only; they are not unique and are never used as an internal key. The
//! catalog is immutable once built for a training run.
//!
//! Malformed records (missing `item_id`, duplicate `item_id`) are rejected
//! per record with a logged warning; ingestion fails only when no valid
//! records remain.
//!
//! # Examples
//!
//! ```
//! use biblos::catalog::{Catalog, Item};
//!
//! let catalog = Catalog::from_items(vec![
//!     Item::new("B1", "Dune").with_description("space politics"),
//!     Item::new("B2", "Foundation").with_description("space empire politics"),
//! ])
//! .unwrap();
//!
//! assert_eq!(catalog.len(), 2);
//! assert!(catalog.contains("B1"));
//! ```

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BiblosError, Result, TitleCandidate};

/// A single book record.
///
/// Only `item_id` is required to be present and unique; the text fields
/// feed the content feature builder and may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable unique key.
    pub item_id: String,
    /// Display title. Not unique; never used as an internal key.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Genre label.
    pub genre: String,
    /// Free-text description.
    pub description: String,
    /// Descriptive tags (set semantics; deduplicated on ingest).
    pub tags: Vec<String>,
}

impl Item {
    /// Create a new item with the given id and title.
    pub fn new<I: Into<String>, T: Into<String>>(item_id: I, title: T) -> Self {
        Item {
            item_id: item_id.into(),
            title: title.into(),
            author: String::new(),
            genre: String::new(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    /// Set the author.
    pub fn with_author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = author.into();
        self
    }

    /// Set the genre.
    pub fn with_genre<S: Into<String>>(mut self, genre: S) -> Self {
        self.genre = genre.into();
        self
    }

    /// Set the description.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Concatenate all textual fields into one document for analysis.
    ///
    /// Empty fields contribute nothing; an item with no text at all yields
    /// an empty document (and later a zero content vector).
    pub fn document_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4 + self.tags.len());
        for field in [&self.title, &self.author, &self.genre, &self.description] {
            if !field.is_empty() {
                parts.push(field);
            }
        }
        for tag in &self.tags {
            if !tag.is_empty() {
                parts.push(tag);
            }
        }
        parts.join(" ")
    }
}

/// A single user-item interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// The user who interacted.
    pub user_id: String,
    /// The item interacted with.
    pub item_id: String,
    /// Rating or interaction weight. Absence of an interaction is distinct
    /// from an explicit 0.0 rating.
    pub rating: f32,
}

impl Interaction {
    /// Create a new interaction.
    pub fn new<U: Into<String>, I: Into<String>>(user_id: U, item_id: I, rating: f32) -> Self {
        Interaction {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }
}

/// In-memory table of items keyed by `item_id`.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    id_to_index: AHashMap<String, usize>,
    skipped: usize,
}

impl Catalog {
    /// Build a catalog from an iterable of item records.
    ///
    /// Records with a missing `item_id` or a duplicate `item_id` are
    /// skipped with a warning (first occurrence wins for duplicates).
    /// Tags are deduplicated. Fails with
    /// [`BiblosError::InvalidRecord`] only if no valid records remain.
    pub fn from_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = Item>,
    {
        let mut catalog = Catalog {
            items: Vec::new(),
            id_to_index: AHashMap::new(),
            skipped: 0,
        };

        for mut item in items {
            if item.item_id.trim().is_empty() {
                warn!(title = %item.title, "item record missing item_id, skipped");
                catalog.skipped += 1;
                continue;
            }
            if catalog.id_to_index.contains_key(&item.item_id) {
                warn!(item_id = %item.item_id, "duplicate item_id, record skipped");
                catalog.skipped += 1;
                continue;
            }

            item.tags.sort_unstable();
            item.tags.dedup();

            catalog
                .id_to_index
                .insert(item.item_id.clone(), catalog.items.len());
            catalog.items.push(item);
        }

        if catalog.items.is_empty() {
            return Err(BiblosError::invalid_record(
                "no valid item records in catalog source",
            ));
        }

        Ok(catalog)
    }

    /// Look up an item by id.
    pub fn get(&self, item_id: &str) -> Option<&Item> {
        self.id_to_index.get(item_id).map(|&i| &self.items[i])
    }

    /// Check whether an item id is in the catalog.
    pub fn contains(&self, item_id: &str) -> bool {
        self.id_to_index.contains_key(item_id)
    }

    /// Number of items in the catalog.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of records skipped during ingestion.
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }

    /// Iterate over items in ingestion order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}

/// Display-only catalog snapshot persisted inside a trained artifact.
///
/// Holds `item_id -> (title, author)` so a loaded engine can resolve
/// title queries and fill display titles without the full catalog.
/// Entries are kept sorted by `item_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    entries: Vec<SnapshotEntry>,
}

/// One `(item_id, title, author)` row of a [`CatalogSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Stable item key.
    pub item_id: String,
    /// Display title.
    pub title: String,
    /// Display author.
    pub author: String,
}

impl CatalogSnapshot {
    /// Build a snapshot from a full catalog.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut entries: Vec<SnapshotEntry> = catalog
            .iter()
            .map(|item| SnapshotEntry {
                item_id: item.item_id.clone(),
                title: item.title.clone(),
                author: item.author.clone(),
            })
            .collect();
        entries.sort_unstable_by(|a, b| a.item_id.cmp(&b.item_id));

        CatalogSnapshot { entries }
    }

    /// Look up the display title for an item id.
    pub fn title_of(&self, item_id: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|entry| entry.item_id.as_str().cmp(item_id))
            .ok()
            .map(|i| self.entries[i].title.as_str())
    }

    /// Check whether an item id is present.
    pub fn contains(&self, item_id: &str) -> bool {
        self.entries
            .binary_search_by(|entry| entry.item_id.as_str().cmp(item_id))
            .is_ok()
    }

    /// Resolve a title query to an item id.
    ///
    /// Matching is exact but case-insensitive; an author, when given,
    /// narrows the match set the same way. Zero matches fail with
    /// [`BiblosError::UnknownItem`]; more than one match fails with
    /// [`BiblosError::AmbiguousTitle`] carrying the candidate set.
    pub fn resolve_title(&self, title: &str, author: Option<&str>) -> Result<&str> {
        let title_folded = title.to_lowercase();
        let author_folded = author.map(|a| a.to_lowercase());

        let matches: Vec<&SnapshotEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.title.to_lowercase() == title_folded)
            .filter(|entry| match &author_folded {
                Some(a) => entry.author.to_lowercase() == *a,
                None => true,
            })
            .collect();

        match matches.len() {
            0 => Err(BiblosError::unknown_item(title)),
            1 => Ok(matches[0].item_id.as_str()),
            _ => Err(BiblosError::AmbiguousTitle {
                title: title.to_string(),
                candidates: matches
                    .iter()
                    .map(|entry| TitleCandidate {
                        item_id: entry.item_id.clone(),
                        title: entry.title.clone(),
                        author: entry.author.clone(),
                    })
                    .collect(),
            }),
        }
    }

    /// Number of entries in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in ascending `item_id` order.
    pub fn iter(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.iter()
    }
}
