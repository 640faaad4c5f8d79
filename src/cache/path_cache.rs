use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use crate::graph::{EntityId, Path};

type PathKey = (EntityId, EntityId, usize);

/// Thread-safe LRU cache for path-search results
///
/// The same (history item, candidate) pairs recur across users who share
/// listening history, so search results are kept keyed by
/// `(source, target, max_hops)`. The graph is immutable, which makes every
/// cached entry valid for the lifetime of the process.
pub struct PathCache {
    cache: Mutex<LruCache<PathKey, Vec<Path>>>,
}

impl PathCache {
    /// Create a new path cache holding at most `capacity` searches
    /// (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    // A panic while holding the lock cannot leave the LRU half-written in a
    // way that matters for lookups, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, LruCache<PathKey, Vec<Path>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get cached paths for a search
    pub fn get(&self, source: &EntityId, target: &EntityId, max_hops: usize) -> Option<Vec<Path>> {
        let key = (source.clone(), target.clone(), max_hops);
        self.lock().get(&key).cloned()
    }

    /// Store the paths found by a search
    pub fn put(&self, source: EntityId, target: EntityId, max_hops: usize, paths: Vec<Path>) {
        self.lock().put((source, target, max_hops), paths);
    }

    /// Get the current number of cached searches
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Hop, RelationType};

    fn id(raw: &str) -> EntityId {
        EntityId::canonical(raw)
    }

    fn one_hop(from: &str, to: &str) -> Vec<Path> {
        vec![Path::new(vec![Hop {
            from: id(from),
            relation: RelationType::PerformedBy,
            to: id(to),
        }])]
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = PathCache::new(10);
        cache.put(id("s1"), id("a1"), 2, one_hop("s1", "a1"));

        let retrieved = cache.get(&id("s1"), &id("a1"), 2);
        assert_eq!(retrieved, Some(one_hop("s1", "a1")));
    }

    #[test]
    fn test_cache_key_includes_hop_budget() {
        let cache = PathCache::new(10);
        cache.put(id("s1"), id("a1"), 2, one_hop("s1", "a1"));

        assert!(cache.get(&id("s1"), &id("a1"), 3).is_none());
        assert!(cache.get(&id("a1"), &id("s1"), 2).is_none());
    }

    #[test]
    fn test_cache_stores_empty_results() {
        let cache = PathCache::new(10);
        cache.put(id("s1"), id("s9"), 2, Vec::new());
        assert_eq!(cache.get(&id("s1"), &id("s9"), 2), Some(Vec::new()));
    }

    #[test]
    fn test_cache_eviction() {
        let cache = PathCache::new(2);

        cache.put(id("s1"), id("t"), 2, Vec::new());
        cache.put(id("s2"), id("t"), 2, Vec::new());
        cache.put(id("s3"), id("t"), 2, Vec::new());

        assert!(cache.get(&id("s1"), &id("t"), 2).is_none());
        assert!(cache.get(&id("s2"), &id("t"), 2).is_some());
        assert!(cache.get(&id("s3"), &id("t"), 2).is_some());
    }

    #[test]
    fn test_cache_len_and_clear() {
        let cache = PathCache::new(10);
        assert!(cache.is_empty());

        cache.put(id("s1"), id("t"), 2, Vec::new());
        cache.put(id("s2"), id("t"), 2, Vec::new());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = PathCache::new(0);
        cache.put(id("s1"), id("t"), 2, Vec::new());
        assert_eq!(cache.len(), 1);
    }
}
