//! Candidate gathering — category-first lookup with a keyword fallback.
//!
//! Stateless over the [`MetadataLookup`] collaborator. Any individual lookup
//! failure is logged and skipped; partial pools are fine. The pool is empty
//! only when every lookup fails or returns nothing.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{Book, MetadataLookup};
use crate::config::RecommenderConfig;

/// Gathers the candidate pool for one recommendation request.
pub struct CandidateGatherer {
    lookup: Arc<dyn MetadataLookup>,
    max_categories: usize,
    per_category: usize,
    fallback_min: usize,
    fallback_limit: usize,
}

impl CandidateGatherer {
    pub fn new(lookup: Arc<dyn MetadataLookup>, config: &RecommenderConfig) -> Self {
        Self {
            lookup,
            max_categories: config.max_categories,
            per_category: config.per_category_results,
            fallback_min: config.fallback_min_candidates,
            fallback_limit: config.fallback_results,
        }
    }

    /// Gather a de-duplicated candidate pool for a source book.
    ///
    /// Primary strategy: one lookup per source category (first three).
    /// Fallback: when the pool is still small, one keyword lookup on the
    /// first three title words. The source book itself is always excluded;
    /// duplicate ids keep their first occurrence.
    pub async fn gather(&self, source: &Book) -> Vec<Book> {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(source.id.clone());
        let mut candidates: Vec<Book> = Vec::new();

        for category in source.categories.iter().take(self.max_categories) {
            match self.lookup.search_by_category(category, self.per_category).await {
                Ok(books) => absorb(books, &mut seen, &mut candidates),
                Err(e) => {
                    warn!(category = %category, error = %e, "category lookup failed, skipping");
                }
            }
        }

        if candidates.len() < self.fallback_min {
            let keywords: Vec<&str> = source.title.split_whitespace().take(3).collect();
            if keywords.is_empty() {
                debug!(source = %source.id, "keyword fallback skipped, source title is empty");
            } else {
                let query = keywords.join(" ");
                match self.lookup.search_by_keywords(&query, self.fallback_limit).await {
                    Ok(books) => absorb(books, &mut seen, &mut candidates),
                    Err(e) => {
                        warn!(query = %query, error = %e, "keyword lookup failed, skipping");
                    }
                }
            }
        }

        debug!(source = %source.id, count = candidates.len(), "gathered candidate pool");
        candidates
    }
}

/// Merge a lookup page into the pool: drop malformed records, keep the first
/// occurrence of each id.
fn absorb(books: Vec<Book>, seen: &mut HashSet<String>, candidates: &mut Vec<Book>) {
    for book in books {
        if !book.is_valid() {
            warn!(title = %book.title, "dropping malformed book record");
            continue;
        }
        if seen.insert(book.id.clone()) {
            candidates.push(book);
        }
    }
}
