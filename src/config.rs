//! Engine configuration.
//!
//! Every tunable in one place with the canonical defaults. Deserializable so
//! the platform can override values from its own config file.

use std::time::Duration;

use serde::Deserialize;

/// Tunables for the recommendation engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Minimum cosine similarity (exclusive) for a candidate to be kept.
    pub similarity_threshold: f32,
    /// Result cap, applied before and after personalization.
    pub max_results: usize,
    /// How many of the source book's categories drive candidate gathering.
    pub max_categories: usize,
    /// Candidates requested per category lookup.
    pub per_category_results: usize,
    /// The keyword fallback fires when the pool is smaller than this.
    pub fallback_min_candidates: usize,
    /// Candidates requested by the keyword fallback.
    pub fallback_results: usize,
    /// History entries fetched for profiles and user-based seeds.
    pub history_depth: usize,
    /// Top categories/authors kept in a preference profile.
    pub top_preferences: usize,
    /// Personalization boost per shared category.
    pub category_boost: f32,
    /// Personalization boost per shared author.
    pub author_boost: f32,
    /// Cache entry time-to-live, in seconds.
    pub cache_ttl_secs: u64,
    /// Entry count that triggers a cache sweep of expired entries.
    pub cache_capacity: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.1,
            max_results: 5,
            max_categories: 3,
            per_category_results: 15,
            fallback_min_candidates: 10,
            fallback_results: 20,
            history_depth: 20,
            top_preferences: 5,
            category_boost: 0.3,
            author_boost: 0.2,
            cache_ttl_secs: 30 * 60,
            cache_capacity: 100,
        }
    }
}

impl RecommenderConfig {
    /// Cache TTL as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_contract() {
        let config = RecommenderConfig::default();
        assert!((config.similarity_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.max_categories, 3);
        assert_eq!(config.per_category_results, 15);
        assert_eq!(config.fallback_min_candidates, 10);
        assert_eq!(config.fallback_results, 20);
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config: RecommenderConfig =
            serde_json::from_str(r#"{"similarity_threshold": 0.2, "max_results": 10}"#).unwrap();
        assert!((config.similarity_threshold - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.per_category_results, 15);
        assert_eq!(config.cache_capacity, 100);
    }
}
