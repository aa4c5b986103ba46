//! First-Level Cache Module
//!
//! Session-scoped result cache. Owned by exactly one session and never shared,
//! so it needs no synchronization.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheEntry, CacheStats, L2Cache, QuerySignature, SequenceCounter};
use crate::datasource::Row;

// == Origin ==
/// The second-level cache generation an L1 entry was copied from.
#[derive(Debug, Clone)]
pub struct Origin {
    pub cache: Arc<L2Cache>,
    pub generation: u64,
}

impl Origin {
    /// True while the source cache has not been invalidated since the copy.
    pub fn is_current(&self) -> bool {
        self.cache.generation() == self.generation
    }
}

#[derive(Debug)]
struct LocalEntry {
    entry: CacheEntry,
    origin: Option<Origin>,
}

// == L1 Cache ==
/// Per-session map from query signature to result.
#[derive(Debug, Default)]
pub struct L1Cache {
    entries: HashMap<QuerySignature, LocalEntry>,
    sequence: SequenceCounter,
    stats: CacheStats,
}

impl L1Cache {
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Looks up a signature.
    ///
    /// An entry copied from a second-level cache that has since been
    /// invalidated is dropped and reported as a miss.
    pub fn get(&mut self, sig: &QuerySignature) -> Option<Row> {
        let stale = match self.entries.get(sig) {
            Some(local) => local.origin.as_ref().is_some_and(|o| !o.is_current()),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if stale {
            self.entries.remove(sig);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(sig).map(|local| local.entry.value.clone())
    }

    // == Put ==
    /// Stores a result loaded from the data source.
    pub fn put(&mut self, sig: QuerySignature, value: Row) {
        self.insert(sig, value, None);
    }

    /// Stores a result copied from a second-level cache.
    pub fn put_from(&mut self, sig: QuerySignature, value: Row, origin: Origin) {
        self.insert(sig, value, Some(origin));
    }

    fn insert(&mut self, sig: QuerySignature, value: Row, origin: Option<Origin>) {
        let entry = CacheEntry::new(value, self.sequence.next());
        self.entries.insert(sig, LocalEntry { entry, origin });
        self.stats.set_total_entries(self.entries.len());
    }

    // == Clear ==
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.stats.record_invalidation();
        }
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
