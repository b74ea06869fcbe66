//! Recommendation service facade — orchestration, caching, metrics.
//!
//! Flow per request: cache read → candidate gathering → vector space →
//! similarity ranking → personalization (when a user is present) → cache
//! write. Everything downstream of the cache is recomputed per request; the
//! vector space is deliberately request-local.

pub mod cache;
pub mod gather;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{Book, HistoryEntry, MetadataLookup, ReadingHistory};
use crate::config::RecommenderConfig;
use crate::embedding::{BookDocument, VectorSpace};
use crate::profile::{personalize, UserProfile};
use crate::ranking::{rank, RecommendationResult};

use cache::{Clock, RecommendationCache, SystemClock};
use gather::CandidateGatherer;

/// Errors surfaced to callers of the facade.
///
/// Upstream unavailability never lands here — the engine degrades to partial
/// or empty results instead. These variants indicate caller misuse.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("source book has an empty identifier")]
    InvalidSource,

    #[error("user id must not be empty")]
    InvalidUser,
}

#[derive(Debug, Default)]
struct Metrics {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    personalized: AtomicU64,
}

/// Point-in-time view of the engine's usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub personalized: u64,
}

/// The recommendation engine facade.
///
/// Owns the candidate gatherer, the result cache, and the collaborator
/// handles. All computation is sequential per request; the cache is the only
/// shared mutable state.
pub struct Recommender {
    gatherer: CandidateGatherer,
    history: Arc<dyn ReadingHistory>,
    cache: RecommendationCache,
    config: RecommenderConfig,
    metrics: Metrics,
}

impl Recommender {
    pub fn new(
        lookup: Arc<dyn MetadataLookup>,
        history: Arc<dyn ReadingHistory>,
        config: RecommenderConfig,
    ) -> Self {
        Self::with_clock(lookup, history, config, Arc::new(SystemClock))
    }

    /// Build with an explicit clock so tests can drive cache expiry.
    pub fn with_clock(
        lookup: Arc<dyn MetadataLookup>,
        history: Arc<dyn ReadingHistory>,
        config: RecommenderConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = RecommendationCache::new(config.cache_ttl(), config.cache_capacity, clock);
        let gatherer = CandidateGatherer::new(lookup, &config);
        Self {
            gatherer,
            history,
            cache,
            config,
            metrics: Metrics::default(),
        }
    }

    /// Ranked recommendations for a source book, optionally personalized
    /// for a user.
    ///
    /// A cache hit short-circuits gathering, vector building, ranking and
    /// personalization. Zero usable candidates resolve to an empty list —
    /// recommendations are best-effort, not an error.
    pub async fn recommend_for_book(
        &self,
        source: &Book,
        user_id: Option<&str>,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        if !source.is_valid() {
            return Err(RecommendError::InvalidSource);
        }
        if let Some(user) = user_id {
            if user.trim().is_empty() {
                return Err(RecommendError::InvalidUser);
            }
        }

        self.metrics.requests.fetch_add(1, Ordering::Relaxed);

        if let Some(results) = self.cache.get(&source.id, user_id) {
            self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(source = %source.id, "serving recommendations from cache");
            return Ok(results);
        }
        self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);

        let results = self.compute(source, user_id).await;
        self.cache.put(&source.id, user_id, results.clone());
        Ok(results)
    }

    /// Ranked recommendations seeded from the user's most recent read.
    ///
    /// The newest history entry becomes the source book (the history
    /// contract carries id, categories and authors — enough to gather by
    /// category). No history, or an unavailable provider, resolves to an
    /// empty list.
    pub async fn recommend_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        if user_id.trim().is_empty() {
            return Err(RecommendError::InvalidUser);
        }

        let history = match self
            .history
            .recent_history(user_id, self.config.history_depth)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!(user = %user_id, error = %e, "history provider unavailable");
                return Ok(Vec::new());
            }
        };

        let Some(latest) = history.first() else {
            debug!(user = %user_id, "no reading history, nothing to seed from");
            return Ok(Vec::new());
        };
        if latest.book_id.trim().is_empty() {
            warn!(user = %user_id, "newest history entry has no book id, skipping");
            return Ok(Vec::new());
        }

        let source = source_from_history(latest);
        self.recommend_for_book(&source, Some(user_id)).await
    }

    /// Drop every cached entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("recommendation cache cleared");
    }

    /// Current usage counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.metrics.requests.load(Ordering::Relaxed),
            cache_hits: self.metrics.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.metrics.cache_misses.load(Ordering::Relaxed),
            personalized: self.metrics.personalized.load(Ordering::Relaxed),
        }
    }

    async fn compute(&self, source: &Book, user_id: Option<&str>) -> Vec<RecommendationResult> {
        let candidates = self.gatherer.gather(source).await;
        if candidates.is_empty() {
            info!(source = %source.id, "no usable candidates, returning empty recommendations");
            return Vec::new();
        }

        // Source is document 0; IDF spans source + candidates together.
        let mut documents = Vec::with_capacity(candidates.len() + 1);
        documents.push(BookDocument::new(source.id.clone(), source.searchable_text()));
        documents.extend(
            candidates
                .iter()
                .map(|book| BookDocument::new(book.id.clone(), book.searchable_text())),
        );

        let space = VectorSpace::build(&documents);
        let Some((source_vector, candidate_vectors)) = space.vectors().split_first() else {
            return Vec::new();
        };

        let ranked = rank(
            source_vector,
            candidate_vectors,
            self.config.similarity_threshold,
            self.config.max_results,
        );
        let mut results: Vec<RecommendationResult> = ranked
            .iter()
            .filter_map(|r| {
                candidates
                    .get(r.index)
                    .map(|book| RecommendationResult::new(book.clone(), r.score))
            })
            .collect();

        if let Some(user) = user_id {
            results = self.personalized(results, user).await;
        }

        debug!(source = %source.id, count = results.len(), "recommendations computed");
        results
    }

    async fn personalized(
        &self,
        results: Vec<RecommendationResult>,
        user_id: &str,
    ) -> Vec<RecommendationResult> {
        let history = match self
            .history
            .recent_history(user_id, self.config.history_depth)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!(user = %user_id, error = %e, "history lookup failed, skipping personalization");
                return results;
            }
        };
        if history.is_empty() {
            return results;
        }

        self.metrics.personalized.fetch_add(1, Ordering::Relaxed);
        let profile = UserProfile::from_history(&history, self.config.top_preferences);
        personalize(
            results,
            &profile,
            self.config.category_boost,
            self.config.author_boost,
            self.config.max_results,
        )
    }
}

/// Synthesize a source book from a history record. Title and description
/// stay empty — category lookups carry the gathering.
fn source_from_history(entry: &HistoryEntry) -> Book {
    Book {
        id: entry.book_id.clone(),
        title: String::new(),
        authors: entry.authors.clone(),
        categories: entry.categories.clone(),
        description: String::new(),
        rating: None,
    }
}
