//! # Similarity Module
//!
//! ## Purpose
//! Sparse term-weight vectors and cosine similarity between them. This is the
//! scoring primitive of the vector search path: all weights are non-negative
//! TF-IDF values, so similarity is mathematically confined to [0, 1].
//!
//! ## Input/Output Specification
//! - **Input**: Two sparse term-weight vectors
//! - **Output**: Cosine similarity in [0, 1]; 0.0 for any zero-magnitude operand
//! - **Guarantees**: Pure, deterministic, never NaN, never errors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sparse term-weight vector.
///
/// Absent terms implicitly carry weight 0; zero weights are never stored, so
/// iteration touches only meaningful entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector(HashMap<String, f64>);

impl SparseVector {
    /// Create an empty (all-zero) vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a term weight; zero weights are dropped to keep the map sparse
    pub fn insert(&mut self, term: String, weight: f64) {
        if weight != 0.0 {
            self.0.insert(term, weight);
        }
    }

    /// Weight of a term, 0.0 when absent
    pub fn weight(&self, term: &str) -> f64 {
        self.0.get(term).copied().unwrap_or(0.0)
    }

    /// Number of non-zero entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is all-zero
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate non-zero entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.0.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// Dot product over the union of term keys.
    ///
    /// Terms absent from either side contribute nothing, so it suffices to
    /// walk the smaller map.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .0
            .iter()
            .map(|(term, weight)| weight * large.weight(term))
            .sum()
    }
}

impl FromIterator<(String, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut vector = SparseVector::new();
        for (term, weight) in iter {
            vector.insert(term, weight);
        }
        vector
    }
}

/// Cosine similarity between two sparse vectors.
///
/// Defined as 0.0 when either operand has zero magnitude (a query that
/// tokenized to nothing, or a document with no indexable text).
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let magnitude = a.norm() * b.norm();
    if magnitude == 0.0 {
        return 0.0;
    }
    a.dot(b) / magnitude
}
