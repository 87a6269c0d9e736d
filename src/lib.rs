//! # Statute Section Search Engine
//!
//! ## Overview
//! This library implements an in-process lexical/semantic search engine that
//! matches free-text legal queries against a corpus of statute sections (penal
//! code, procedure code, evidence act, etc.) and returns ranked candidates.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `tokenizer`: Normalization and term extraction
//! - `index`: TF-IDF index construction over the loaded corpus
//! - `similarity`: Sparse vectors and cosine similarity
//! - `search`: Query routing (exact section lookup vs. vector search) and ranking
//! - `loader`: Corpus JSON ingestion into normalized documents
//! - `cache`: Persistent index snapshot cache for fast restarts
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Statute section documents (JSON), search queries (text)
//! - **Output**: Ranked search results with section metadata and scores
//! - **Performance**: Full rebuild at startup, interactive query latency,
//!   deterministic results
//!
//! ## Usage
//! ```rust,no_run
//! use statute_search::{Config, CorpusLoader, SearchEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let documents = CorpusLoader::load_from_file(&config.corpus.path)?;
//!     let engine = SearchEngine::new(&config)?;
//!     engine.rebuild(documents).await?;
//!     let results = engine.search("cheating dishonestly", 5)?;
//!     println!("Found {} results", results.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod cache;
pub mod config;
pub mod errors;
pub mod index;
pub mod loader;
pub mod search;
pub mod similarity;
pub mod tokenizer;

// Re-exports for convenience
pub use cache::IndexCache;
pub use config::Config;
pub use errors::{Result, SearchError};
pub use index::{Index, IndexBuilder, IndexSnapshot, IndexStats};
pub use loader::CorpusLoader;
pub use search::{EngineStats, MatchType, SearchEngine, SearchResult};
pub use tokenizer::Tokenizer;

use serde::{Deserialize, Serialize};

/// One statute section, normalized at ingestion time.
///
/// Documents are created once when the corpus is loaded and are immutable for
/// the lifetime of a built index. A corpus reload replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable unique identifier composed from act and section, e.g. "IPC-420"
    pub id: String,
    /// Free-form alphanumeric section label ("420", "66A", "2(1)(d)")
    pub section_number: String,
    /// Display name of the governing statute; not unique per document
    pub act_name: String,
    /// Section title
    pub title: String,
    /// Body or definition text
    pub body_text: Option<String>,
    /// Penalty description
    pub penalty_text: Option<String>,
    /// Illustrative case text
    pub example_text: Option<String>,
}

impl Document {
    /// Concatenate the text fields, in fixed order, into the indexable text.
    ///
    /// Absent or empty fields contribute nothing. A document whose every field
    /// is empty tokenizes to nothing and stays reachable only through exact
    /// section lookup.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        if !self.title.is_empty() {
            parts.push(&self.title);
        }
        for field in [&self.body_text, &self.penalty_text, &self.example_text] {
            if let Some(text) = field.as_deref() {
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
        parts.join(" ")
    }

    /// Case-insensitive exact comparison against a section-number query.
    ///
    /// Both sides keep their punctuation; only trimming and case folding are
    /// applied, so labels like "2(1)(d)" compare intact.
    pub fn matches_section(&self, query: &str) -> bool {
        self.section_number.trim().eq_ignore_ascii_case(query.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document {
            id: "IPC-420".to_string(),
            section_number: "420".to_string(),
            act_name: "Indian Penal Code, 1860".to_string(),
            title: "Cheating".to_string(),
            body_text: Some("cheating dishonestly inducing delivery of property".to_string()),
            penalty_text: None,
            example_text: Some(String::new()),
        }
    }

    #[test]
    fn searchable_text_skips_absent_and_empty_fields() {
        let doc = sample();
        assert_eq!(
            doc.searchable_text(),
            "Cheating cheating dishonestly inducing delivery of property"
        );
    }

    #[test]
    fn section_match_is_case_insensitive_and_exact() {
        let mut doc = sample();
        doc.section_number = "66A".to_string();
        assert!(doc.matches_section("66a"));
        assert!(doc.matches_section(" 66A "));
        assert!(!doc.matches_section("66"));
    }
}
