//! Similarity ranking — threshold filter, stable ordering, truncation.
//!
//! Pure functions over in-memory vectors; no collaborator calls here.

use serde::Serialize;

use crate::catalog::Book;
use crate::embedding::{cosine_similarity, DocVector};

/// A ranked candidate: position in the candidate batch plus its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub index: usize,
    pub score: f32,
}

/// A recommendation as returned to the caller.
///
/// `personalization_score` and `match_reason` are set only when a user
/// profile was applied. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub book: Book,
    pub similarity_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

impl RecommendationResult {
    pub fn new(book: Book, similarity_score: f32) -> Self {
        Self {
            book,
            similarity_score,
            personalization_score: None,
            match_reason: None,
        }
    }
}

/// Rank candidate vectors against a source vector.
///
/// Candidates scoring at or below `threshold` are dropped. The sort is
/// stable and descending, so ties keep candidate input order and the output
/// is deterministic. At most `max` results are returned.
pub fn rank(
    source: &DocVector,
    candidates: &[DocVector],
    threshold: f32,
    max: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .enumerate()
        .map(|(index, vector)| RankedCandidate {
            index,
            score: cosine_similarity(source, vector),
        })
        .filter(|r| r.score > threshold)
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(max);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_scores_at_or_below_threshold() {
        let source = vec![1.0, 0.0];
        let candidates = vec![
            vec![1.0, 0.0], // score 1.0
            vec![0.0, 1.0], // score 0.0
        ];
        let ranked = rank(&source, &candidates, 0.1, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 0);

        // a score exactly equal to the threshold is excluded
        let ranked = rank(&source, &candidates, 1.0, 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn orders_descending() {
        let source = vec![1.0, 1.0, 0.0];
        let candidates = vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
        ];
        let ranked = rank(&source, &candidates, 0.0, 5);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn ties_keep_input_order() {
        let source = vec![1.0, 0.0];
        let candidates = vec![
            vec![2.0, 0.0], // score 1.0
            vec![3.0, 0.0], // score 1.0
            vec![0.5, 0.0], // score 1.0
        ];
        let ranked = rank(&source, &candidates, 0.1, 5);
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn truncates_to_max() {
        let source = vec![1.0];
        let candidates: Vec<DocVector> = (0..10).map(|_| vec![1.0]).collect();
        let ranked = rank(&source, &candidates, 0.1, 5);
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn zero_source_vector_yields_nothing() {
        let source = vec![0.0, 0.0];
        let candidates = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert!(rank(&source, &candidates, 0.1, 5).is_empty());
    }

    #[test]
    fn empty_candidates_yield_nothing() {
        let source = vec![1.0, 0.0];
        assert!(rank(&source, &[], 0.1, 5).is_empty());
    }
}
