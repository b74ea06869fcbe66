//! Per-(source, user) result cache with lazy TTL expiry.
//!
//! Shared mutable state behind an `RwLock`; a poisoned lock degrades to a
//! cache miss rather than tearing down the request. The clock is injectable
//! so tests drive expiry without sleeping. There is no background sweeper —
//! expiry is checked at read time, and a capacity-triggered sweep drops
//! expired entries on write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::ranking::RecommendationResult;

/// Time source for cache entries. Injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock advanced by hand. Lets tests cross the TTL deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Advance the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += delta;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Instant::now())
    }
}

struct CacheEntry {
    results: Vec<RecommendationResult>,
    created_at: Instant,
}

/// Memoized recommendation lists keyed by (source book, requesting user).
///
/// Entries expire whole — there is no partial invalidation. Concurrent
/// recomputation of the same key is acceptable; writes are last-wins.
pub struct RecommendationCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl RecommendationCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
            clock,
        }
    }

    /// Fresh results for a key, if present and unexpired.
    pub fn get(&self, source_id: &str, user_id: Option<&str>) -> Option<Vec<RecommendationResult>> {
        let key = cache_key(source_id, user_id);
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("cache lock poisoned, treating read as a miss");
                return None;
            }
        };
        let entry = entries.get(&key)?;
        if self.clock.now().duration_since(entry.created_at) >= self.ttl {
            debug!(key = %key, "cache entry expired");
            return None;
        }
        Some(entry.results.clone())
    }

    /// Store results for a key. Sweeps expired entries when the map grows
    /// past capacity.
    pub fn put(&self, source_id: &str, user_id: Option<&str>, results: Vec<RecommendationResult>) {
        let key = cache_key(source_id, user_id);
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("cache lock poisoned, skipping write");
                return;
            }
        };
        let now = self.clock.now();
        entries.insert(
            key,
            CacheEntry {
                results,
                created_at: now,
            },
        );
        if entries.len() > self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, entry| now.duration_since(entry.created_at) < ttl);
            debug!(remaining = entries.len(), "cache sweep after capacity overflow");
        }
    }

    /// Drop every entry, returning all keys to the absent state.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key format: source book id plus the requesting user, or "anonymous".
fn cache_key(source_id: &str, user_id: Option<&str>) -> String {
    format!("{}:{}", source_id, user_id.unwrap_or("anonymous"))
}
