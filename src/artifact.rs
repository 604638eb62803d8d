//! Versioned persistence of trained models.
//!
//! A [`TrainedArtifact`] bundles everything `recommend` needs: the
//! catalog snapshot for title resolution, both fitted models, and build
//! metadata. On disk it is framed as:
//!
//! ```text
//! +-------+---------+----------+------------------+----------+
//! | magic | version | body_len | bincode body     | crc32    |
//! | BSGE  | u32 LE  | u64 LE   | body_len bytes   | u32 LE   |
//! +-------+---------+----------+------------------+----------+
//! ```
//!
//! Saving writes to a uniquely named temp file and renames it over the
//! final name, so a failed save never leaves a loadable partial
//! artifact. Loading is pure deserialization: models are restored
//! bit-for-bit, never re-derived from source data.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::CatalogSnapshot;
use crate::collaborative::CollaborativeModel;
use crate::content::ContentModel;
use crate::error::{BiblosError, Result};
use crate::storage::{Storage, StorageOutput};

/// Magic bytes identifying an artifact file.
pub const MAGIC: [u8; 4] = *b"BSGE";

/// Current artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

/// Bytes before the body: magic + version + body length.
const HEADER_LEN: u64 = 4 + 4 + 8;

/// Bytes after the body: crc32 checksum.
const TRAILER_LEN: u64 = 4;

/// Everything a trained engine needs to serve recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedArtifact {
    /// Catalog snapshot for id and title resolution.
    pub snapshot: CatalogSnapshot,
    /// Fitted content model.
    pub content: ContentModel,
    /// Fitted collaborative model.
    pub collaborative: CollaborativeModel,
    /// Build metadata.
    pub metadata: ArtifactMetadata,
}

/// Metadata recorded when an artifact is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// When the models were fitted.
    pub created_at: DateTime<Utc>,
    /// Number of catalog items.
    pub item_count: usize,
    /// Number of distinct users in the interactions.
    pub user_count: usize,
    /// Number of kept interactions.
    pub interaction_count: usize,
    /// Size of the content vocabulary.
    pub vocabulary_size: usize,
}

impl TrainedArtifact {
    /// Bundle freshly fitted models into an artifact.
    pub fn new(
        snapshot: CatalogSnapshot,
        content: ContentModel,
        collaborative: CollaborativeModel,
    ) -> Self {
        let metadata = ArtifactMetadata {
            created_at: Utc::now(),
            item_count: snapshot.len(),
            user_count: collaborative.matrix().user_count(),
            interaction_count: collaborative.matrix().interaction_count(),
            vocabulary_size: content.vocabulary().size(),
        };

        Self {
            snapshot,
            content,
            collaborative,
            metadata,
        }
    }
}

/// Save an artifact under `name`, atomically replacing any previous one.
pub fn save(artifact: &TrainedArtifact, storage: &dyn Storage, name: &str) -> Result<()> {
    let body = bincode::serialize(artifact)?;
    let checksum = crc32fast::hash(&body);

    let (temp_name, mut output) = storage.create_temp_output(name)?;
    let written = write_framed(&mut output, &body, checksum).and_then(|()| output.close());
    if let Err(e) = written {
        let _ = storage.delete_file(&temp_name);
        return Err(e);
    }

    if let Err(e) = storage.rename_file(&temp_name, name) {
        let _ = storage.delete_file(&temp_name);
        return Err(e);
    }

    info!(
        name,
        bytes = body.len(),
        items = artifact.metadata.item_count,
        "saved artifact"
    );
    Ok(())
}

fn write_framed(output: &mut Box<dyn StorageOutput>, body: &[u8], checksum: u32) -> Result<()> {
    output.write_all(&MAGIC)?;
    output.write_u32::<LittleEndian>(ARTIFACT_VERSION)?;
    output.write_u64::<LittleEndian>(body.len() as u64)?;
    output.write_all(body)?;
    output.write_u32::<LittleEndian>(checksum)?;
    Ok(())
}

/// Load an artifact previously written by [`save`].
///
/// Fails with [`BiblosError::IncompatibleVersion`] when the format
/// version differs, and [`BiblosError::CorruptArtifact`] for anything
/// else wrong with the bytes: bad magic, truncation, checksum mismatch,
/// or an undecodable body.
pub fn load(storage: &dyn Storage, name: &str) -> Result<TrainedArtifact> {
    let mut input = storage.open_input(name)?;
    let total_size = input.size()?;

    let mut magic = [0u8; 4];
    input
        .read_exact(&mut magic)
        .map_err(|_| BiblosError::corrupt_artifact("artifact too short for header"))?;
    if magic != MAGIC {
        return Err(BiblosError::corrupt_artifact("bad magic bytes"));
    }

    let version = input
        .read_u32::<LittleEndian>()
        .map_err(|_| BiblosError::corrupt_artifact("artifact too short for header"))?;
    if version != ARTIFACT_VERSION {
        return Err(BiblosError::IncompatibleVersion {
            found: version,
            expected: ARTIFACT_VERSION,
        });
    }

    let body_len = input
        .read_u64::<LittleEndian>()
        .map_err(|_| BiblosError::corrupt_artifact("artifact too short for header"))?;
    if body_len != total_size.saturating_sub(HEADER_LEN + TRAILER_LEN) {
        return Err(BiblosError::corrupt_artifact("artifact length mismatch"));
    }

    let mut body = vec![0u8; body_len as usize];
    input
        .read_exact(&mut body)
        .map_err(|_| BiblosError::corrupt_artifact("truncated artifact body"))?;

    let stored_checksum = input
        .read_u32::<LittleEndian>()
        .map_err(|_| BiblosError::corrupt_artifact("missing checksum trailer"))?;
    if crc32fast::hash(&body) != stored_checksum {
        return Err(BiblosError::corrupt_artifact("checksum mismatch"));
    }

    let artifact: TrainedArtifact = bincode::deserialize(&body)
        .map_err(|e| BiblosError::corrupt_artifact(format!("undecodable artifact body: {e}")))?;

    info!(
        name,
        items = artifact.metadata.item_count,
        users = artifact.metadata.user_count,
        "loaded artifact"
    );
    Ok(artifact)
}
