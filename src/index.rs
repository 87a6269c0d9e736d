//! # Index Module
//!
//! ## Purpose
//! Builds the TF-IDF vector space over a loaded corpus: document frequency,
//! inverse document frequency, and per-document sparse TF-IDF vectors.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized statute documents
//! - **Output**: An immutable [`Index`] bundle (documents, vocabulary, IDF map,
//!   per-document vectors)
//! - **Lifecycle**: Built once per corpus load; rebuilding always produces a
//!   fresh, independent `Index` that replaces the old one atomically
//!
//! ## Key Features
//! - Document frequency from per-document distinct token sets
//! - IDF as ln(N / df); terms present in every document keep IDF 0 and stay
//!   in the vocabulary
//! - TF normalized by total token count, guarded against empty documents
//! - Async chunked build that yields to the runtime between chunks
//! - Snapshot form for the persistence cache, with vectors re-derived on load

use crate::errors::{Result, SearchError};
use crate::similarity::SparseVector;
use crate::tokenizer::Tokenizer;
use crate::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Bump when the snapshot layout or the Document shape changes; a mismatch
/// invalidates cached snapshots instead of misreading them.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Documents tokenized per chunk before yielding back to the runtime
const BUILD_CHUNK_SIZE: usize = 64;

/// Builds [`Index`] instances from documents or cached snapshots
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    tokenizer: Tokenizer,
}

/// Immutable TF-IDF index over one corpus snapshot.
///
/// Queries only read it; a rebuild constructs a whole new `Index` and swaps
/// the shared reference, never mutating this one in place.
#[derive(Debug)]
pub struct Index {
    documents: Vec<Document>,
    tokenized: Vec<Vec<String>>,
    vocabulary: Vec<String>,
    idf: HashMap<String, f64>,
    vectors: Vec<SparseVector>,
    built_at: DateTime<Utc>,
}

/// Summary of a completed build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub vocabulary_size: usize,
    pub built_at: DateTime<Utc>,
}

/// Serializable index state for the persistence cache.
///
/// Holds the documents and their token streams but not the computed vectors,
/// which are cheap to regenerate and bulky to serialize; [`IndexBuilder::from_snapshot`]
/// re-derives IDF and vectors on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub schema_version: u32,
    pub documents: Vec<Document>,
    pub vocabulary: Vec<String>,
    pub tokenized_documents: Vec<Vec<String>>,
    pub last_updated: DateTime<Utc>,
}

impl IndexBuilder {
    /// Create a builder using the given tokenizer
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Tokenizer this builder (and its indexes) normalize with.
    ///
    /// Query tokenization must go through the same instance so query terms
    /// land in the same vocabulary.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Build a fresh index over the given documents.
    ///
    /// Tokenization chunks through the corpus and yields to the runtime
    /// between chunks; this is the only phase with wall-clock time
    /// proportional to corpus size. Fails with [`SearchError::EmptyCorpus`]
    /// for zero documents.
    pub async fn build(&self, documents: Vec<Document>) -> Result<Index> {
        if documents.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }

        let started = std::time::Instant::now();
        let mut tokenized = Vec::with_capacity(documents.len());
        for (position, document) in documents.iter().enumerate() {
            let tokens: Vec<String> = self.tokenizer.tokenize(&document.searchable_text()).collect();
            tokenized.push(tokens);
            if (position + 1) % BUILD_CHUNK_SIZE == 0 {
                tokio::task::yield_now().await;
            }
        }

        let index = assemble(documents, tokenized);
        tracing::info!(
            documents = index.len(),
            vocabulary = index.vocabulary_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index built"
        );
        Ok(index)
    }

    /// Reconstruct an index from a cached snapshot, skipping tokenization.
    ///
    /// IDF and TF-IDF vectors are always re-derived from the cached token
    /// streams. A version mismatch, inconsistent lengths, or a vocabulary
    /// that no longer matches the re-derived one all mean the snapshot is
    /// stale or damaged and map to [`SearchError::CacheCorrupt`].
    pub fn from_snapshot(&self, snapshot: IndexSnapshot) -> Result<Index> {
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(SearchError::CacheCorrupt {
                reason: format!(
                    "snapshot schema version {} does not match expected {}",
                    snapshot.schema_version, SNAPSHOT_SCHEMA_VERSION
                ),
            });
        }
        if snapshot.documents.is_empty() {
            return Err(SearchError::CacheCorrupt {
                reason: "snapshot contains no documents".to_string(),
            });
        }
        if snapshot.documents.len() != snapshot.tokenized_documents.len() {
            return Err(SearchError::CacheCorrupt {
                reason: format!(
                    "snapshot has {} documents but {} token streams",
                    snapshot.documents.len(),
                    snapshot.tokenized_documents.len()
                ),
            });
        }

        let index = assemble(snapshot.documents, snapshot.tokenized_documents);
        if index.vocabulary != snapshot.vocabulary {
            return Err(SearchError::CacheCorrupt {
                reason: "re-derived vocabulary does not match cached vocabulary".to_string(),
            });
        }
        tracing::info!(
            documents = index.len(),
            vocabulary = index.vocabulary_size(),
            "index restored from snapshot"
        );
        Ok(index)
    }
}

/// Compute df, idf, and per-document vectors from tokenized documents.
///
/// Callers guarantee a non-empty document list.
fn assemble(documents: Vec<Document>, tokenized: Vec<Vec<String>>) -> Index {
    let total_documents = documents.len();

    // Document frequency over distinct per-document tokens
    let mut document_frequency: HashMap<String, usize> = HashMap::new();
    for tokens in &tokenized {
        let distinct: HashSet<&String> = tokens.iter().collect();
        for term in distinct {
            *document_frequency.entry(term.clone()).or_insert(0) += 1;
        }
    }

    let idf: HashMap<String, f64> = document_frequency
        .into_iter()
        .map(|(term, df)| {
            let idf = (total_documents as f64 / df as f64).ln();
            (term, idf)
        })
        .collect();

    let mut vocabulary: Vec<String> = idf.keys().cloned().collect();
    vocabulary.sort();

    let vectors: Vec<SparseVector> = tokenized
        .iter()
        .map(|tokens| {
            term_frequencies(tokens)
                .into_iter()
                .map(|(term, tf)| {
                    let weight = tf * idf.get(&term).copied().unwrap_or(0.0);
                    (term, weight)
                })
                .collect()
        })
        .collect();

    Index {
        documents,
        tokenized,
        vocabulary,
        idf,
        vectors,
        built_at: Utc::now(),
    }
}

/// Term frequency: occurrence count over max(1, total tokens).
///
/// The max(1, _) guard keeps an empty document at an all-zero vector instead
/// of dividing by zero.
fn term_frequencies(tokens: &[String]) -> HashMap<String, f64> {
    let total = tokens.len().max(1) as f64;
    let mut counts: HashMap<String, f64> = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    for frequency in counts.values_mut() {
        *frequency /= total;
    }
    counts
}

impl Index {
    /// All documents, in corpus order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document at a corpus position
    pub fn document(&self, position: usize) -> &Document {
        &self.documents[position]
    }

    /// TF-IDF vector of the document at a corpus position
    pub fn vector(&self, position: usize) -> &SparseVector {
        &self.vectors[position]
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false for a successfully built index
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of distinct indexed terms
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Sorted vocabulary
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// IDF of a term, 0.0 for terms outside the vocabulary
    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    /// Build time of this index
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// TF-IDF vector for a tokenized query against this index's vocabulary.
    ///
    /// Terms unseen in the corpus are ignored; they cannot contribute weight.
    pub fn query_vector(&self, tokens: &[String]) -> SparseVector {
        term_frequencies(tokens)
            .into_iter()
            .filter_map(|(term, tf)| {
                self.idf
                    .get(&term)
                    .map(|idf| (term, tf * idf))
            })
            .collect()
    }

    /// Build summary
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.len(),
            vocabulary_size: self.vocabulary_size(),
            built_at: self.built_at,
        }
    }

    /// Serializable snapshot for the persistence cache
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            documents: self.documents.clone(),
            vocabulary: self.vocabulary.clone(),
            tokenized_documents: self.tokenized.clone(),
            last_updated: self.built_at,
        }
    }
}
