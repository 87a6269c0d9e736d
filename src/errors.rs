//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the statute search engine, covering index
//! construction, query routing, corpus loading, and the persistence cache.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from engine components
//! - **Output**: Structured error types with context
//! - **Error Categories**: Index, Search, Corpus, Cache, Configuration
//!
//! ## Design
//! "No results" is never an error: an empty query, a query with only unknown
//! terms, or a query nothing matches all produce an empty result list. The
//! variants below are reserved for conditions the caller must act on.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the statute search engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// Index construction was attempted on zero documents
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    /// Search was invoked before any successful index build
    #[error("search index has not been built yet")]
    IndexNotReady,

    /// The index cache could not be opened or accessed
    #[error("index cache unavailable: {reason}")]
    CacheUnavailable { reason: String },

    /// The cached index snapshot could not be decoded or is stale
    #[error("index cache corrupt: {reason}")]
    CacheCorrupt { reason: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Corpus file could not be parsed into documents
    #[error("failed to parse corpus from {file}: {details}")]
    CorpusParsing { file: String, details: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot encoding/decoding errors
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl SearchError {
    /// Whether the caller can degrade gracefully instead of aborting.
    ///
    /// Cache failures always fall back to a full rebuild; `IndexNotReady` is
    /// retriable once a build completes.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SearchError::IndexNotReady
                | SearchError::CacheUnavailable { .. }
                | SearchError::CacheCorrupt { .. }
        )
    }

    /// Error category for log labelling
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::EmptyCorpus => "index",
            SearchError::IndexNotReady => "search",
            SearchError::CacheUnavailable { .. } | SearchError::CacheCorrupt { .. } => "cache",
            SearchError::Config { .. } => "configuration",
            SearchError::CorpusParsing { .. } | SearchError::Json(_) => "corpus",
            SearchError::Io(_) | SearchError::Serialization(_) => "storage",
        }
    }
}
