//! # Search Engine Module
//!
//! ## Purpose
//! Query routing and result ranking over the built TF-IDF index: structured
//! section-number queries go to exact lookup, everything else to cosine
//! similarity ranking.
//!
//! ## Input/Output Specification
//! - **Input**: Query text, maximum result count
//! - **Output**: Ranked search results with scores and match-type tags
//! - **Routing**: Exact match always wins when the query looks like a section
//!   number and at least one document matches; otherwise vector search
//!
//! ## Concurrency
//! The built index is immutable shared read-only state. Any number of
//! concurrent searches may run against the same index without coordination;
//! a rebuild constructs a new index and atomically swaps the shared
//! reference, so in-flight searches keep the snapshot they started with.

use crate::config::{Config, SearchConfig};
use crate::errors::{Result, SearchError};
use crate::index::{Index, IndexBuilder, IndexSnapshot, IndexStats};
use crate::similarity::cosine_similarity;
use crate::tokenizer::Tokenizer;
use crate::Document;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Main search engine
pub struct SearchEngine {
    search_config: SearchConfig,
    builder: IndexBuilder,
    section_pattern: Regex,
    index: RwLock<Option<Arc<Index>>>,
}

/// Search result with section metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched statute section
    pub document: Document,
    /// Relevance score in [0.0, 1.0]; exact section matches score 1.0
    pub score: f64,
    /// How the match was found
    pub match_type: MatchType,
    /// 1-based position in the returned list
    pub rank: usize,
}

/// Type of match found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Exact section-number match
    Exact,
    /// Cosine-similarity match from vector search
    Semantic,
    /// Reserved for the external keyword fallback classifier; never produced
    /// by this engine
    Keyword,
}

/// Read-only engine introspection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_documents: usize,
    pub vocabulary_size: usize,
    pub is_indexed: bool,
    pub acts_covered: Vec<String>,
}

impl SearchEngine {
    /// Create a new engine; no index is available until the first successful
    /// [`SearchEngine::rebuild`] or [`SearchEngine::restore`].
    pub fn new(config: &Config) -> Result<Self> {
        // Structured section identifiers: digits, optional single letter
        // suffix, optional parenthesized sub-clauses ("420", "66A", "2(1)(d)").
        // Applied to the raw trimmed query, before any tokenization.
        let section_pattern =
            Regex::new(r"^(?i)\d+[a-z]?(\([a-z0-9]+\))*$").map_err(|e| SearchError::Config {
                message: format!("invalid section pattern: {}", e),
            })?;

        Ok(Self {
            search_config: config.search.clone(),
            builder: IndexBuilder::new(Tokenizer::new(&config.tokenizer)),
            section_pattern,
            index: RwLock::new(None),
        })
    }

    /// Whether an index has been built and queries can be served
    pub fn is_ready(&self) -> bool {
        self.index.read().is_some()
    }

    /// Default result count from configuration
    pub fn default_max_results(&self) -> usize {
        self.search_config.max_results
    }

    /// Build a fresh index over the given documents and swap it in.
    ///
    /// Copy-on-rebuild: the new index is fully constructed before the shared
    /// reference changes, so concurrent searches observe either the old or
    /// the new index, never a mixture. When rebuilds race, the last swap wins.
    pub async fn rebuild(&self, documents: Vec<Document>) -> Result<IndexStats> {
        let index = self.builder.build(documents).await?;
        let stats = index.stats();
        *self.index.write() = Some(Arc::new(index));
        Ok(stats)
    }

    /// Swap in an index reconstructed from a cached snapshot
    pub fn restore(&self, snapshot: IndexSnapshot) -> Result<IndexStats> {
        let index = self.builder.from_snapshot(snapshot)?;
        let stats = index.stats();
        *self.index.write() = Some(Arc::new(index));
        Ok(stats)
    }

    /// Snapshot the current index for the persistence cache
    pub fn snapshot(&self) -> Result<IndexSnapshot> {
        Ok(self.current_index()?.snapshot())
    }

    /// Search the corpus.
    ///
    /// A query shaped like a section number routes to exact lookup first and
    /// returns immediately when it hits; a section-shaped query matching no
    /// document falls through to vector search, since a numeric-looking query
    /// can still be meaningful as a keyword. No-match conditions return an
    /// empty list, never an error; the only failure is
    /// [`SearchError::IndexNotReady`] before the first build.
    pub fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let index = self.current_index()?;
        let trimmed = query.trim();

        if self.section_pattern.is_match(trimmed) {
            let exact = exact_lookup(&index, trimmed, max_results);
            if !exact.is_empty() {
                return Ok(exact);
            }
            tracing::debug!(query = trimmed, "section-shaped query matched nothing, trying vector search");
        }

        Ok(self.vector_search(&index, trimmed, max_results))
    }

    /// Read-only index statistics; all zeros before the first build
    pub fn stats(&self) -> EngineStats {
        match &*self.index.read() {
            Some(index) => {
                let mut acts: Vec<String> = index
                    .documents()
                    .iter()
                    .map(|doc| doc.act_name.clone())
                    .collect();
                acts.sort();
                acts.dedup();
                EngineStats {
                    total_documents: index.len(),
                    vocabulary_size: index.vocabulary_size(),
                    is_indexed: true,
                    acts_covered: acts,
                }
            }
            None => EngineStats {
                total_documents: 0,
                vocabulary_size: 0,
                is_indexed: false,
                acts_covered: Vec::new(),
            },
        }
    }

    /// Snapshot the shared index reference for one query
    fn current_index(&self) -> Result<Arc<Index>> {
        self.index.read().clone().ok_or(SearchError::IndexNotReady)
    }

    /// Cosine-similarity ranking against every document vector
    fn vector_search(&self, index: &Index, query: &str, max_results: usize) -> Vec<SearchResult> {
        let tokens: Vec<String> = self.builder.tokenizer().tokenize(query).collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let query_vector = index.query_vector(&tokens);
        if query_vector.is_empty() {
            // Every query term is unknown to the corpus; all scores would be 0
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = (0..index.len())
            .filter_map(|position| {
                let score = cosine_similarity(&query_vector, index.vector(position));
                (score > self.search_config.min_score).then_some((position, score))
            })
            .collect();

        // Stable sort keeps equal scores in corpus order, the deterministic
        // tie-break.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(max_results);

        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (position, score))| SearchResult {
                document: index.document(position).clone(),
                score,
                match_type: MatchType::Semantic,
                rank: rank + 1,
            })
            .collect()
    }
}

/// Scan the document list for exact section-number matches, in corpus order
fn exact_lookup(index: &Index, query: &str, max_results: usize) -> Vec<SearchResult> {
    index
        .documents()
        .iter()
        .filter(|doc| doc.matches_section(query))
        .take(max_results)
        .enumerate()
        .map(|(rank, doc)| SearchResult {
            document: doc.clone(),
            score: 1.0,
            match_type: MatchType::Exact,
            rank: rank + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, section: &str, act: &str, title: &str, body: &str) -> Document {
        Document {
            id: id.to_string(),
            section_number: section.to_string(),
            act_name: act.to_string(),
            title: title.to_string(),
            body_text: Some(body.to_string()),
            penalty_text: None,
            example_text: None,
        }
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc(
                "IPC-420",
                "420",
                "Indian Penal Code, 1860",
                "Cheating",
                "cheating dishonestly inducing delivery of property",
            ),
            doc(
                "IPC-406",
                "406",
                "Indian Penal Code, 1860",
                "Criminal breach of trust",
                "dishonest misappropriation of property entrusted",
            ),
            doc(
                "IEA-3",
                "3",
                "Indian Evidence Act, 1872",
                "Interpretation clause",
                "evidence means and includes statements which the court permits",
            ),
        ]
    }

    async fn engine_with(documents: Vec<Document>) -> SearchEngine {
        let engine = SearchEngine::new(&Config::default()).unwrap();
        engine.rebuild(documents).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn search_before_build_fails_with_index_not_ready() {
        let engine = SearchEngine::new(&Config::default()).unwrap();
        assert!(!engine.is_ready());
        let err = engine.search("theft", 5).unwrap_err();
        assert!(matches!(err, SearchError::IndexNotReady));
    }

    #[tokio::test]
    async fn exact_section_match_takes_precedence() {
        let engine = engine_with(corpus()).await;
        let results = engine.search("420", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.section_number, "420");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[0].match_type, MatchType::Exact);
        assert_eq!(results[0].rank, 1);
    }

    #[tokio::test]
    async fn exact_lookup_is_case_insensitive_and_returns_all_acts() {
        let mut documents = corpus();
        documents.push(doc(
            "ITA-66A",
            "66A",
            "Information Technology Act, 2000",
            "Offensive messages",
            "sending offensive messages through communication service",
        ));
        documents.push(doc(
            "CPA-66a",
            "66a",
            "Consumer Protection Act, 2019",
            "Placeholder",
            "placeholder provision text",
        ));
        let engine = engine_with(documents).await;

        let results = engine.search("66a", 5).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.match_type == MatchType::Exact));
        assert_eq!(results[0].document.id, "ITA-66A");
        assert_eq!(results[1].document.id, "CPA-66a");
        assert_eq!(results[1].rank, 2);
    }

    #[tokio::test]
    async fn section_shaped_query_without_match_falls_through() {
        let engine = engine_with(corpus()).await;
        // "999" is section-shaped but matches no document; the fall-through
        // vector search finds no overlapping terms either
        let results = engine.search("999", 5).unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn semantic_query_ranks_overlapping_document_first() {
        let engine = engine_with(corpus()).await;
        let results = engine
            .search("dishonest misappropriation of entrusted property", 5)
            .unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].document.id, "IPC-406");
        assert_eq!(results[0].match_type, MatchType::Semantic);
        assert!(results[0].score > 0.0 && results[0].score <= 1.0);
        for window in results.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[tokio::test]
    async fn empty_query_returns_empty_list() {
        let engine = engine_with(corpus()).await;
        assert!(engine.search("", 5).unwrap().is_empty());
        assert!(engine.search("   ", 5).unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_of_only_stopwords_or_unknown_terms_returns_empty() {
        let engine = engine_with(corpus()).await;
        assert!(engine.search("the of and", 5).unwrap().is_empty());
        assert!(engine.search("zeppelin dirigible airship", 5).unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_are_truncated_to_max_results() {
        let mut documents = Vec::new();
        for i in 0..6 {
            documents.push(doc(
                &format!("MVA-{i}"),
                &format!("{i}"),
                "Motor Vehicles Act, 1988",
                "Negligent driving",
                "negligence while driving causing danger",
            ));
        }
        // One document without the shared terms keeps their idf above zero
        documents.push(doc(
            "MVA-99",
            "99",
            "Motor Vehicles Act, 1988",
            "Definitions",
            "registration certificate transport vehicle",
        ));
        let engine = engine_with(documents).await;

        let results = engine.search("negligence while driving", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
        // Equal scores fall back to corpus order
        assert_eq!(results[0].document.id, "MVA-0");
        assert_eq!(results[1].document.id, "MVA-1");
    }

    #[tokio::test]
    async fn threshold_excludes_weak_candidates() {
        let mut config = Config::default();
        config.search.min_score = 0.5;
        let engine = SearchEngine::new(&config).unwrap();
        engine.rebuild(corpus()).await.unwrap();

        let results = engine
            .search("dishonest misappropriation of entrusted property", 5)
            .unwrap();
        // Only the strongly overlapping section survives a 0.5 floor
        assert!(results.iter().all(|r| r.score > 0.5));
        assert!(results.iter().all(|r| r.document.id == "IPC-406"));
    }

    #[tokio::test]
    async fn search_is_deterministic() {
        let engine = engine_with(corpus()).await;
        let first = engine.search("property dishonestly", 5).unwrap();
        let second = engine.search("property dishonestly", 5).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.document.id, b.document.id);
            assert_eq!(a.score, b.score);
            assert_eq!(a.rank, b.rank);
        }
    }

    #[tokio::test]
    async fn rebuild_swaps_atomically_and_old_snapshot_stays_intact() {
        let engine = engine_with(corpus()).await;
        let old_index = engine.current_index().unwrap();
        assert_eq!(old_index.len(), 3);

        let replacement = vec![doc(
            "CRPC-154",
            "154",
            "Code of Criminal Procedure, 1973",
            "First information report",
            "information relating to a cognizable offence given to an officer",
        )];
        engine.rebuild(replacement).await.unwrap();

        // The old snapshot is untouched by the swap
        assert_eq!(old_index.len(), 3);
        assert_eq!(old_index.document(0).id, "IPC-420");

        let stats = engine.stats();
        assert_eq!(stats.total_documents, 1);
        let results = engine.search("154", 5).unwrap();
        assert_eq!(results[0].document.id, "CRPC-154");
    }

    #[tokio::test]
    async fn stats_report_sorted_deduplicated_acts() {
        let engine = engine_with(corpus()).await;
        let stats = engine.stats();
        assert!(stats.is_indexed);
        assert_eq!(stats.total_documents, 3);
        assert!(stats.vocabulary_size > 0);
        assert_eq!(
            stats.acts_covered,
            vec![
                "Indian Evidence Act, 1872".to_string(),
                "Indian Penal Code, 1860".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn restore_from_snapshot_serves_identical_results() {
        let engine = engine_with(corpus()).await;
        let expected = engine.search("property dishonestly", 5).unwrap();

        let restored = SearchEngine::new(&Config::default()).unwrap();
        restored.restore(engine.snapshot().unwrap()).unwrap();
        let actual = restored.search("property dishonestly", 5).unwrap();

        assert_eq!(expected.len(), actual.len());
        for (a, b) in expected.iter().zip(actual.iter()) {
            assert_eq!(a.document.id, b.document.id);
            assert!((a.score - b.score).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn parenthesized_sub_clause_labels_match_exactly() {
        let mut documents = corpus();
        documents.push(doc(
            "CPA-2(1)(d)",
            "2(1)(d)",
            "Consumer Protection Act, 2019",
            "Consumer",
            "person who buys goods for consideration",
        ));
        let engine = engine_with(documents).await;
        let results = engine.search("2(1)(d)", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "CPA-2(1)(d)");
        assert_eq!(results[0].match_type, MatchType::Exact);
    }
}
