//! TF-IDF vectors over a single request's document batch.
//!
//! Term frequency is normalized by document length; inverse document
//! frequency is `ln(N / (1 + df))`, clamped at zero so weights stay
//! non-negative. Vectors are dense over the batch vocabulary to keep the
//! similarity loop branch-free.

use std::collections::{HashMap, HashSet};

use crate::text::tokenize;

use super::DocVector;

/// One document entering the vector space: a book id plus its concatenated
/// searchable text (title, description, category labels).
#[derive(Debug, Clone)]
pub struct BookDocument {
    pub id: String,
    pub text: String,
}

impl BookDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// The vector space of one recommendation request.
///
/// Holds the shared vocabulary and one dense TF-IDF vector per input
/// document, in input order. Duplicate documents are legal and yield
/// identical vectors; a single-document batch yields all-zero vectors
/// (every term is ubiquitous, so no term carries signal).
pub struct VectorSpace {
    /// term → dimension index
    vocabulary: HashMap<String, usize>,
    vectors: Vec<DocVector>,
}

impl VectorSpace {
    /// Build the space over a batch of documents (source + candidates).
    ///
    /// IDF is computed once over the whole batch — mixing the source into
    /// the corpus keeps scores request-local and comparable.
    pub fn build(documents: &[BookDocument]) -> Self {
        let total_docs = documents.len() as f32;
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(&d.text)).collect();

        // Vocabulary and document frequency in one pass.
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();
            for term in unique {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
                if !vocabulary.contains_key(term) {
                    let idx = vocabulary.len();
                    vocabulary.insert(term.to_string(), idx);
                }
            }
        }

        let dims = vocabulary.len();
        let mut idf = vec![0.0f32; dims];
        for (term, &idx) in &vocabulary {
            let df = doc_freq.get(term).copied().unwrap_or(0) as f32;
            // ln(N / (1 + df)), clamped: terms present in every document
            // carry no signal and must not go negative
            idf[idx] = (total_docs / (1.0 + df)).ln().max(0.0);
        }

        let vectors = tokenized
            .iter()
            .map(|tokens| {
                let mut vector = vec![0.0f32; dims];
                if tokens.is_empty() {
                    return vector;
                }
                let total = tokens.len() as f32;
                let mut counts: HashMap<&str, f32> = HashMap::new();
                for token in tokens {
                    *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
                }
                for (term, count) in counts {
                    if let Some(&idx) = vocabulary.get(term) {
                        vector[idx] = (count / total) * idf[idx];
                    }
                }
                vector
            })
            .collect();

        Self {
            vocabulary,
            vectors,
        }
    }

    /// All document vectors, in input order.
    pub fn vectors(&self) -> &[DocVector] {
        &self.vectors
    }

    /// The vector of one document by input position.
    pub fn vector(&self, index: usize) -> Option<&DocVector> {
        self.vectors.get(index)
    }

    /// Dimensionality of the space (vocabulary size).
    pub fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    /// The dimension index of a vocabulary term, if present.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}
