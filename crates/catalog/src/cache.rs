//! Entity Cache
//!
//! Memoizes provider lookups by entity id so that a node touched by both
//! frontiers, or by two searches, only costs one external fetch.
//!
//! - One bounded LRU per entity kind (detail, movie credits, person credits)
//! - Failed lookups are never cached, so a later call retries the provider
//! - Payloads are handed out as `Arc`s; a hit never clones a credit list
//! - No time-based expiry: the source data is treated as static for the
//!   lifetime of the process

use std::fmt::Display;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::provider::MetadataProvider;
use crate::types::{
    EntityKind, MovieCredits, MovieDetail, MovieId, MovieSummary, PersonCredits, PersonId,
};

/// Default number of entries kept per entity kind
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

type Store<K, V> = Mutex<LruCache<K, Arc<V>>>;

/// Snapshot of cache counters and sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Misses where the provider also failed
    pub failures: u64,
    pub movie_details: usize,
    pub movie_credits: usize,
    pub person_credits: usize,
}

/// Thread-safe, bounded memo of provider lookups.
///
/// Shared across concurrent searches behind an `Arc`. Each kind's LRU sits
/// behind its own mutex; the lock is released before the provider is called,
/// so a slow fetch never blocks unrelated hits. Two threads missing on the
/// same id may both fetch it; the second `put` simply refreshes the entry.
pub struct EntityCache {
    provider: Arc<dyn MetadataProvider>,
    capacity: NonZeroUsize,
    details: Store<MovieId, MovieDetail>,
    movie_credits: Store<MovieId, MovieCredits>,
    person_credits: Store<PersonId, PersonCredits>,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl EntityCache {
    /// Create a cache with [`DEFAULT_CACHE_CAPACITY`] entries per kind
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self::with_capacity(provider, DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache holding at most `capacity` entries per kind.
    ///
    /// A capacity of zero is bumped to one.
    pub fn with_capacity(provider: Arc<dyn MetadataProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            provider,
            capacity,
            details: Mutex::new(LruCache::new(capacity)),
            movie_credits: Mutex::new(LruCache::new(capacity)),
            person_credits: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn movie_detail(&self, id: MovieId) -> Option<Arc<MovieDetail>> {
        self.get_or_fetch(EntityKind::MovieDetail, &self.details, id, |p| {
            p.movie_detail(id)
        })
    }

    pub fn movie_credits(&self, id: MovieId) -> Option<Arc<MovieCredits>> {
        self.get_or_fetch(EntityKind::MovieCredits, &self.movie_credits, id, |p| {
            p.movie_credits(id)
        })
    }

    pub fn person_credits(&self, id: PersonId) -> Option<Arc<PersonCredits>> {
        self.get_or_fetch(EntityKind::PersonCredits, &self.person_credits, id, |p| {
            p.person_credits(id)
        })
    }

    /// Title search is not keyed by id, so it always goes to the provider
    pub fn search_movies(&self, title: &str) -> Result<Vec<MovieSummary>, ProviderError> {
        self.provider.search_movies(title)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of cached entries of one kind
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::MovieDetail => store_len(&self.details),
            EntityKind::MovieCredits => store_len(&self.movie_credits),
            EntityKind::PersonCredits => store_len(&self.person_credits),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            movie_details: store_len(&self.details),
            movie_credits: store_len(&self.movie_credits),
            person_credits: store_len(&self.person_credits),
        }
    }

    fn get_or_fetch<K, V, F>(
        &self,
        kind: EntityKind,
        store: &Store<K, V>,
        id: K,
        fetch: F,
    ) -> Option<Arc<V>>
    where
        K: Hash + Eq + Copy + Display,
        F: FnOnce(&dyn MetadataProvider) -> Result<V, ProviderError>,
    {
        // `get` (not `peek`) so a hit refreshes the entry's recency
        if let Some(hit) = lock(store).get(&id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(Arc::clone(hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        match fetch(self.provider.as_ref()) {
            Ok(value) => {
                let value = Arc::new(value);
                if let Some((evicted, _)) = lock(store).push(id, Arc::clone(&value)) {
                    if evicted != id {
                        debug!("Evicted {} {} from cache", kind, evicted);
                    }
                }
                Some(value)
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Lookup of {} {} failed via {}: {}", kind, id, self.provider.name(), e);
                None
            }
        }
    }
}

fn store_len<K: Hash + Eq, V>(store: &Store<K, V>) -> usize {
    lock(store).len()
}

/// LRU operations never panic midway, so a poisoned store is still consistent
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Provider that records every call it receives, in order
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<(EntityKind, u32)>>,
        missing: Vec<u32>,
    }

    impl RecordingProvider {
        fn calls_for(&self, kind: EntityKind) -> Vec<u32> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, id)| *id)
                .collect()
        }

        fn record(&self, kind: EntityKind, id: u32) -> Result<(), ProviderError> {
            self.calls.lock().unwrap().push((kind, id));
            if self.missing.contains(&id) {
                return Err(ProviderError::Status { kind, id, status: 404 });
            }
            Ok(())
        }
    }

    impl MetadataProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, ProviderError> {
            self.record(EntityKind::MovieDetail, id)?;
            Ok(MovieDetail {
                id,
                title: format!("Movie {}", id),
                release_date: None,
                poster_path: None,
                genres: vec![],
                popularity: 0.0,
            })
        }

        fn movie_credits(&self, id: MovieId) -> Result<MovieCredits, ProviderError> {
            self.record(EntityKind::MovieCredits, id)?;
            Ok(MovieCredits::default())
        }

        fn person_credits(&self, id: PersonId) -> Result<PersonCredits, ProviderError> {
            self.record(EntityKind::PersonCredits, id)?;
            Ok(PersonCredits::default())
        }

        fn search_movies(&self, _title: &str) -> Result<Vec<MovieSummary>, ProviderError> {
            Ok(vec![])
        }
    }

    fn cache_with(provider: Arc<RecordingProvider>, capacity: usize) -> EntityCache {
        EntityCache::with_capacity(provider, capacity)
    }

    #[test]
    fn test_hit_does_not_call_provider() {
        let provider = Arc::new(RecordingProvider::default());
        let cache = cache_with(provider.clone(), 10);

        let first = cache.movie_detail(1).unwrap();
        let second = cache.movie_detail(1).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.calls_for(EntityKind::MovieDetail), vec![1]);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.movie_details, 1);
    }

    #[test]
    fn test_evicts_least_recently_accessed_entry() {
        let provider = Arc::new(RecordingProvider::default());
        let cache = cache_with(provider.clone(), 2);

        cache.movie_credits(1);
        cache.movie_credits(2);
        // Touch 1 so that 2 becomes the least recently used
        cache.movie_credits(1);
        cache.movie_credits(3);

        assert_eq!(cache.len(EntityKind::MovieCredits), 2);

        // 1 and 3 are still cached, 2 was evicted and must be refetched
        cache.movie_credits(1);
        cache.movie_credits(3);
        assert_eq!(provider.calls_for(EntityKind::MovieCredits), vec![1, 2, 3]);

        cache.movie_credits(2);
        assert_eq!(provider.calls_for(EntityKind::MovieCredits), vec![1, 2, 3, 2]);
        assert_eq!(cache.len(EntityKind::MovieCredits), 2);
    }

    #[test]
    fn test_capacity_is_per_kind() {
        let provider = Arc::new(RecordingProvider::default());
        let cache = cache_with(provider, 1);

        cache.movie_detail(7);
        cache.movie_credits(7);
        cache.person_credits(7);

        let stats = cache.stats();
        assert_eq!(stats.movie_details, 1);
        assert_eq!(stats.movie_credits, 1);
        assert_eq!(stats.person_credits, 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let provider = Arc::new(RecordingProvider {
            missing: vec![404],
            ..Default::default()
        });
        let cache = cache_with(provider.clone(), 10);

        assert!(cache.person_credits(404).is_none());
        assert!(cache.person_credits(404).is_none());

        // Both calls reached the provider
        assert_eq!(provider.calls_for(EntityKind::PersonCredits), vec![404, 404]);
        assert_eq!(cache.len(EntityKind::PersonCredits), 0);
        assert_eq!(cache.stats().failures, 2);
    }

    #[test]
    fn test_poisoned_store_keeps_caching() {
        let provider = Arc::new(RecordingProvider::default());
        let cache = Arc::new(cache_with(provider.clone(), 10));

        let poisoner = Arc::clone(&cache);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.details.lock().unwrap();
            panic!("poison the detail store");
        })
        .join();
        assert!(result.is_err());
        assert!(cache.details.is_poisoned());

        cache.movie_detail(1).unwrap();
        cache.movie_detail(1).unwrap();

        assert_eq!(provider.calls_for(EntityKind::MovieDetail), vec![1]);
        assert_eq!(cache.len(EntityKind::MovieDetail), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let provider = Arc::new(RecordingProvider::default());
        let cache = cache_with(provider, 0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let provider = Arc::new(RecordingProvider::default());
        let cache = cache_with(provider, 5);

        let mut seen = HashMap::new();
        for id in 0..50 {
            seen.insert(id, cache.movie_detail(id).is_some());
            assert!(cache.len(EntityKind::MovieDetail) <= 5);
        }
        assert!(seen.values().all(|ok| *ok));
    }
}
