//! User preference profiles and personalization re-ranking.
//!
//! A profile is the top categories and authors by frequency over the user's
//! recent reading history. Personalization multiplies raw similarity by a
//! boost for overlap with those preferences, then re-sorts.

use std::collections::HashMap;

use crate::catalog::HistoryEntry;
use crate::ranking::RecommendationResult;

/// Top categories and authors from a user's reading history.
///
/// Computed fresh per personalization call; never persisted by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub top_categories: Vec<String>,
    pub top_authors: Vec<String>,
}

impl UserProfile {
    /// Build a profile from reading history, keeping the `top_n` most
    /// frequent categories and authors. Frequency ties keep first-seen
    /// order, so the profile is deterministic.
    pub fn from_history(history: &[HistoryEntry], top_n: usize) -> Self {
        Self {
            top_categories: ranked_top(
                history.iter().flat_map(|e| e.categories.iter().cloned()),
                top_n,
            ),
            top_authors: ranked_top(
                history.iter().flat_map(|e| e.authors.iter().cloned()),
                top_n,
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top_categories.is_empty() && self.top_authors.is_empty()
    }
}

/// Count occurrences preserving first-seen order, return the `top_n` most
/// frequent values. The sort is stable, so equal counts keep insertion order.
fn ranked_top<I: IntoIterator<Item = String>>(values: I, top_n: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(top_n).map(|(value, _)| value).collect()
}

/// Re-rank results by a user's preference profile.
///
/// Each result's similarity is multiplied by
/// `1.0 + category_boost·|shared categories| + author_boost·|shared authors|`,
/// then the list is re-sorted descending (stable) and truncated to `max`.
/// An empty profile returns the input unchanged.
pub fn personalize(
    mut results: Vec<RecommendationResult>,
    profile: &UserProfile,
    category_boost: f32,
    author_boost: f32,
    max: usize,
) -> Vec<RecommendationResult> {
    if profile.is_empty() {
        return results;
    }

    for result in &mut results {
        let shared_categories: Vec<&str> = result
            .book
            .categories
            .iter()
            .filter(|c| profile.top_categories.contains(c))
            .map(|c| c.as_str())
            .collect();
        let shared_authors: Vec<&str> = result
            .book
            .authors
            .iter()
            .filter(|a| profile.top_authors.contains(a))
            .map(|a| a.as_str())
            .collect();

        let multiplier = 1.0
            + category_boost * shared_categories.len() as f32
            + author_boost * shared_authors.len() as f32;

        result.similarity_score *= multiplier;
        result.personalization_score = Some(multiplier);
        result.match_reason = Some(match_reason(&shared_categories, &shared_authors));
    }

    results.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(max);
    results
}

/// Human-readable explanation of why a personalized result matched.
fn match_reason(shared_categories: &[&str], shared_authors: &[&str]) -> String {
    match (shared_categories.is_empty(), shared_authors.is_empty()) {
        (false, false) => format!(
            "matches your favorite categories ({}) and authors ({})",
            shared_categories.join(", "),
            shared_authors.join(", ")
        ),
        (false, true) => format!(
            "matches your favorite categories: {}",
            shared_categories.join(", ")
        ),
        (true, false) => format!("by authors you read: {}", shared_authors.join(", ")),
        (true, true) => "topically similar to your selection".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Book;

    fn entry(categories: &[&str], authors: &[&str]) -> HistoryEntry {
        HistoryEntry {
            book_id: "h".into(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            authors: authors.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn result(id: &str, categories: &[&str], authors: &[&str], score: f32) -> RecommendationResult {
        RecommendationResult::new(
            Book {
                id: id.into(),
                title: id.into(),
                authors: authors.iter().map(|s| s.to_string()).collect(),
                categories: categories.iter().map(|s| s.to_string()).collect(),
                description: String::new(),
                rating: None,
            },
            score,
        )
    }

    #[test]
    fn profile_keeps_top_five_by_frequency() {
        let history: Vec<HistoryEntry> = (0..6)
            .map(|i| {
                // "c0" appears 6 times, "c1" 5 times, ... "c5" once
                let cats: Vec<String> = (0..=i).map(|j| format!("c{j}")).collect();
                HistoryEntry {
                    book_id: format!("b{i}"),
                    categories: cats.iter().rev().map(|c| c.to_string()).collect(),
                    authors: vec![],
                }
            })
            .collect();

        let profile = UserProfile::from_history(&history, 5);
        assert_eq!(profile.top_categories, vec!["c0", "c1", "c2", "c3", "c4"]);
        assert!(profile.top_authors.is_empty());
    }

    #[test]
    fn frequency_ties_keep_first_seen_order() {
        let history = vec![
            entry(&["Novela", "Historia"], &["Borges", "Cortázar"]),
            entry(&["Historia", "Novela"], &["Cortázar", "Borges"]),
        ];
        let profile = UserProfile::from_history(&history, 5);
        assert_eq!(profile.top_categories, vec!["Novela", "Historia"]);
        assert_eq!(profile.top_authors, vec!["Borges", "Cortázar"]);
    }

    #[test]
    fn empty_history_is_a_noop() {
        let profile = UserProfile::from_history(&[], 5);
        assert!(profile.is_empty());

        let input = vec![result("a", &["Historia"], &[], 0.8)];
        let output = personalize(input.clone(), &profile, 0.3, 0.2, 5);
        assert_eq!(output, input);
        assert_eq!(output[0].personalization_score, None);
    }

    #[test]
    fn boosts_by_shared_categories_and_authors() {
        let profile = UserProfile {
            top_categories: vec!["Historia".into(), "Filosofía".into()],
            top_authors: vec!["Platón".into()],
        };
        let results = personalize(
            vec![result("a", &["Historia", "Filosofía"], &["Platón"], 0.5)],
            &profile,
            0.3,
            0.2,
            5,
        );

        // 1.0 + 0.3·2 + 0.2·1 = 1.8
        let p = results[0].personalization_score.unwrap();
        assert!((p - 1.8).abs() < 1e-6);
        assert!((results[0].similarity_score - 0.9).abs() < 1e-6);

        let reason = results[0].match_reason.as_deref().unwrap();
        assert!(reason.contains("Historia"));
        assert!(reason.contains("Platón"));
    }

    #[test]
    fn no_overlap_keeps_score_with_unit_multiplier() {
        let profile = UserProfile {
            top_categories: vec!["Cocina".into()],
            top_authors: vec![],
        };
        let results = personalize(
            vec![result("a", &["Historia"], &[], 0.5)],
            &profile,
            0.3,
            0.2,
            5,
        );
        let p = results[0].personalization_score.unwrap();
        assert!((p - 1.0).abs() < 1e-6);
        assert!((results[0].similarity_score - 0.5).abs() < 1e-6);
        assert_eq!(
            results[0].match_reason.as_deref(),
            Some("topically similar to your selection")
        );
    }

    #[test]
    fn preference_overlap_outranks_higher_raw_similarity() {
        // a user whose history is 100% Filosofía: the Filosofía-tagged
        // result must overtake the raw-similarity leader
        let history = vec![
            entry(&["Filosofía"], &[]),
            entry(&["Filosofía"], &[]),
            entry(&["Filosofía"], &[]),
        ];
        let profile = UserProfile::from_history(&history, 5);

        let results = personalize(
            vec![
                result("leader", &["Historia"], &[], 0.9),
                result("filosofia", &["Filosofía"], &[], 0.8),
            ],
            &profile,
            0.3,
            0.2,
            5,
        );

        assert_eq!(results[0].book.id, "filosofia");
        assert!((results[0].similarity_score - 0.8 * 1.3).abs() < 1e-6);
        assert_eq!(results[1].book.id, "leader");
    }

    #[test]
    fn truncates_to_result_cap() {
        let profile = UserProfile {
            top_categories: vec!["Historia".into()],
            top_authors: vec![],
        };
        let input: Vec<RecommendationResult> = (0..8)
            .map(|i| result(&format!("b{i}"), &["Historia"], &[], 0.5))
            .collect();
        let results = personalize(input, &profile, 0.3, 0.2, 5);
        assert_eq!(results.len(), 5);
        // equal boosted scores keep input order
        assert_eq!(results[0].book.id, "b0");
    }
}
