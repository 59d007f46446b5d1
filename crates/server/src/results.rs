//! Query result state.
//!
//! Every search gets its own record, keyed by a random id, so concurrent
//! searches never overwrite each other's explored set. A "latest" pointer
//! serves callers that do not pass an id. Records are bounded with LRU
//! eviction; an evicted id reads back as unknown.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lru::LruCache;
use uuid::Uuid;

use catalog::MovieId;
use search::{SearchOutcome, Strategy};

/// Identifier handed back with every search
pub type SearchId = Uuid;

/// Number of search records kept by default
pub const DEFAULT_RESULT_CAPACITY: usize = 64;

/// What one finished search left behind
#[derive(Debug, Clone)]
pub struct SearchRecord {
    pub id: SearchId,
    pub source: MovieId,
    pub target: MovieId,
    pub strategy: Strategy,
    pub path: Option<Vec<MovieId>>,
    /// Explored ids in discovery order
    pub processed: Vec<MovieId>,
    pub elapsed: Duration,
}

impl SearchRecord {
    pub fn from_outcome(outcome: SearchOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: outcome.source,
            target: outcome.target,
            strategy: outcome.strategy,
            path: outcome.path,
            processed: outcome.processed,
            elapsed: outcome.elapsed,
        }
    }
}

/// Bounded, keyed store of search records
pub struct ResultStore {
    records: Mutex<LruCache<SearchId, Arc<SearchRecord>>>,
    latest: Mutex<Option<SearchId>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RESULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            records: Mutex::new(LruCache::new(capacity)),
            latest: Mutex::new(None),
        }
    }

    /// Store a record and make it the latest one
    pub fn insert(&self, record: SearchRecord) -> Arc<SearchRecord> {
        let record = Arc::new(record);
        lock(&self.records).push(record.id, Arc::clone(&record));
        // Last writer wins
        *lock(&self.latest) = Some(record.id);
        record
    }

    pub fn get(&self, id: &SearchId) -> Option<Arc<SearchRecord>> {
        lock(&self.records).get(id).cloned()
    }

    /// Most recently stored record, if it has not been evicted
    pub fn latest(&self) -> Option<Arc<SearchRecord>> {
        let id = (*lock(&self.latest))?;
        self.get(&id)
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A panic while holding the lock leaves the data consistent, so keep going
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
