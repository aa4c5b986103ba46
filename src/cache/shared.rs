//! Second-Level Cache Module
//!
//! Namespace-scoped cache shared by every session. Reads from a session are
//! staged on the session side and promoted here only on commit or close.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Namespace, QuerySignature, SequenceCounter};
use crate::datasource::Row;

// == Staged Entry ==
/// A read waiting for its session to commit.
///
/// Carries the cache generation observed when the read missed the cache; a
/// flush drops it if the cache has been invalidated since.
#[derive(Debug, Clone)]
pub struct StagedEntry {
    pub signature: QuerySignature,
    pub value: Row,
    pub generation: u64,
}

impl StagedEntry {
    pub fn new(signature: QuerySignature, value: Row, generation: u64) -> Self {
        Self {
            signature,
            value,
            generation,
        }
    }
}

// == Flush Outcome ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub promoted: usize,
    pub discarded: usize,
}

#[derive(Debug)]
struct Inner {
    entries: LruCache<QuerySignature, CacheEntry>,
    sequence: SequenceCounter,
    stats: CacheStats,
    generation: u64,
}

// == L2 Cache ==
/// Shared result cache for one namespace or alias group.
///
/// `get`, `flush` and `invalidate_all` serialize on one lock, so a flush never
/// interleaves with an invalidation.
#[derive(Debug)]
pub struct L2Cache {
    id: Namespace,
    inner: Mutex<Inner>,
}

impl L2Cache {
    // == Constructor ==
    /// Creates an empty cache owned by namespace `id`, bounded to `max_entries`.
    pub fn new(id: Namespace, max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            id,
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                sequence: SequenceCounter::default(),
                stats: CacheStats::default(),
                generation: 0,
            }),
        }
    }

    /// The namespace that owns this cache.
    pub fn id(&self) -> &Namespace {
        &self.id
    }

    // == Get ==
    pub fn get(&self, sig: &QuerySignature) -> Option<Row> {
        self.lookup(sig).0
    }

    /// Like `get`, also returning the generation observed under the same lock.
    ///
    /// On a miss the generation is what a read loaded from the data source
    /// must be staged with.
    pub fn lookup(&self, sig: &QuerySignature) -> (Option<Row>, u64) {
        let mut inner = self.inner.lock();
        let value = inner.entries.get(sig).map(|e| e.value.clone());

        if value.is_some() {
            inner.stats.record_hit();
        } else {
            inner.stats.record_miss();
        }

        debug!(
            "Cache Hit Ratio [{}]: {:.2}",
            self.id,
            inner.stats.hit_rate()
        );
        (value, inner.generation)
    }

    // == Stage ==
    /// Stamps a read with the current generation for a later flush.
    pub fn stage(&self, sig: QuerySignature, value: Row) -> StagedEntry {
        StagedEntry::new(sig, value, self.generation())
    }

    // == Flush ==
    /// Promotes one session's staged reads into the visible store.
    ///
    /// Entries staged before the latest invalidation are discarded.
    pub fn flush(&self, staged: Vec<StagedEntry>) -> FlushOutcome {
        let mut inner = self.inner.lock();
        let mut outcome = FlushOutcome::default();

        for item in staged {
            if item.generation != inner.generation {
                outcome.discarded += 1;
                continue;
            }

            if !inner.entries.contains(&item.signature)
                && inner.entries.len() >= inner.entries.cap().get()
            {
                if let Some((evicted, entry)) = inner.entries.pop_lru() {
                    inner.stats.record_eviction();
                    debug!(
                        "Evicted {} from [{}] (inserted #{})",
                        evicted, self.id, entry.sequence
                    );
                }
            }

            let seq = inner.sequence.next();
            inner
                .entries
                .put(item.signature, CacheEntry::new(item.value, seq));
            outcome.promoted += 1;
        }

        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        outcome
    }

    // == Invalidate All ==
    /// Clears every entry and bumps the generation.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock();
        let cleared = inner.entries.len();
        inner.entries.clear();
        inner.generation += 1;
        inner.stats.record_invalidation();
        inner.stats.set_total_entries(0);
        debug!(
            "Invalidated second-level cache [{}]: {} entries cleared, generation {}",
            self.id, cleared, inner.generation
        );
    }

    /// Number of invalidations applied so far.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
