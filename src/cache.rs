//! # Persistence Cache Module
//!
//! ## Purpose
//! Durably stores the built index snapshot so subsequent startups skip corpus
//! parsing and tokenization. A key-value blob store (sled) holds one
//! bincode-encoded, optionally gzip-compressed snapshot under a fixed key.
//!
//! ## Input/Output Specification
//! - **Input**: [`IndexSnapshot`] to persist
//! - **Output**: The snapshot on load, or `None` on a miss
//! - **Failure mode**: An unavailable or corrupt cache is never fatal;
//!   callers log it and fall back to a full rebuild from the corpus
//!
//! ## Layout
//! The snapshot carries documents, vocabulary, tokenized documents, a schema
//! version, and the build timestamp. TF-IDF vectors are not stored: they are
//! cheap to regenerate and bulky to serialize, so the loader re-derives them.

use crate::config::CacheConfig;
use crate::errors::{Result, SearchError};
use crate::index::IndexSnapshot;
use std::io::{Read, Write};

/// Fixed key the snapshot blob lives under
const SNAPSHOT_KEY: &[u8] = b"index_snapshot";

/// Tree name inside the sled database
const TREE_NAME: &str = "index_cache";

/// Gzip stream magic bytes; detected on load so a config change between runs
/// cannot misread an existing blob
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Persistent index snapshot cache backed by sled
pub struct IndexCache {
    db: sled::Db,
    tree: sled::Tree,
    compress: bool,
}

impl IndexCache {
    /// Open (or create) the cache database
    pub fn open(config: &CacheConfig) -> Result<Self> {
        let db = sled::open(&config.path).map_err(|e| SearchError::CacheUnavailable {
            reason: format!("failed to open cache at {:?}: {}", config.path, e),
        })?;
        let tree = db
            .open_tree(TREE_NAME)
            .map_err(|e| SearchError::CacheUnavailable {
                reason: format!("failed to open cache tree: {}", e),
            })?;
        Ok(Self {
            db,
            tree,
            compress: config.compress,
        })
    }

    /// Persist a snapshot, replacing any previous one
    pub fn save(&self, snapshot: &IndexSnapshot) -> Result<()> {
        let encoded = bincode::serialize(snapshot)?;
        let data = if self.compress {
            compress(&encoded)?
        } else {
            encoded
        };

        self.tree
            .insert(SNAPSHOT_KEY, data)
            .map_err(|e| SearchError::CacheUnavailable {
                reason: format!("cache write failed: {}", e),
            })?;
        self.db.flush().map_err(|e| SearchError::CacheUnavailable {
            reason: format!("cache flush failed: {}", e),
        })?;

        tracing::debug!(
            documents = snapshot.documents.len(),
            vocabulary = snapshot.vocabulary.len(),
            "index snapshot cached"
        );
        Ok(())
    }

    /// Load the cached snapshot.
    ///
    /// `Ok(None)` is a plain miss. A blob that cannot be decompressed or
    /// decoded returns [`SearchError::CacheCorrupt`]; the caller treats that
    /// as a miss too and rebuilds.
    pub fn load(&self) -> Result<Option<IndexSnapshot>> {
        let data = self
            .tree
            .get(SNAPSHOT_KEY)
            .map_err(|e| SearchError::CacheUnavailable {
                reason: format!("cache read failed: {}", e),
            })?;
        let Some(data) = data else {
            return Ok(None);
        };

        let encoded = if data.starts_with(&GZIP_MAGIC) {
            decompress(&data)?
        } else {
            data.to_vec()
        };
        let snapshot =
            bincode::deserialize(&encoded).map_err(|e| SearchError::CacheCorrupt {
                reason: format!("snapshot blob undecodable: {}", e),
            })?;
        Ok(Some(snapshot))
    }

    /// Drop any cached snapshot
    pub fn clear(&self) -> Result<()> {
        self.tree
            .remove(SNAPSHOT_KEY)
            .map_err(|e| SearchError::CacheUnavailable {
                reason: format!("cache clear failed: {}", e),
            })?;
        self.db.flush().map_err(|e| SearchError::CacheUnavailable {
            reason: format!("cache flush failed: {}", e),
        })?;
        Ok(())
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| SearchError::CacheCorrupt {
            reason: format!("snapshot blob failed to decompress: {}", e),
        })?;
    Ok(decompressed)
}
