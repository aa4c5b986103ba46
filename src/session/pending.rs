//! Per-session log of staged reads and dirtied caches, applied to the
//! second-level caches on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{FlushOutcome, L2Cache, Namespace, QuerySignature, StagedEntry};
use crate::datasource::Row;

#[derive(Debug)]
struct CacheGroup {
    cache: Arc<L2Cache>,
    staged: Vec<StagedEntry>,
    dirty: bool,
}

// == Commit Outcome ==
/// What a commit did to the second-level caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Caches cleared because the session mutated them
    pub invalidated: usize,
    /// Caches that received a flush
    pub flushed: usize,
    /// Staged reads made visible to other sessions
    pub promoted: usize,
    /// Staged reads dropped
    pub discarded: usize,
}

// == Pending Writes ==
/// Staged reads and dirty marks, grouped by cache instance.
///
/// Namespaces sharing a cache through a cache-ref land in the same group.
#[derive(Debug, Default)]
pub struct PendingWrites {
    groups: BTreeMap<Namespace, CacheGroup>,
}

impl PendingWrites {
    pub fn new() -> Self {
        Self::default()
    }

    fn group(&mut self, cache: &Arc<L2Cache>) -> &mut CacheGroup {
        self.groups
            .entry(cache.id().clone())
            .or_insert_with(|| CacheGroup {
                cache: cache.clone(),
                staged: Vec::new(),
                dirty: false,
            })
    }

    /// Buffers a read for promotion into `cache` at commit.
    ///
    /// `generation` is the cache generation observed when the read missed.
    pub fn stage(
        &mut self,
        cache: &Arc<L2Cache>,
        sig: QuerySignature,
        value: Row,
        generation: u64,
    ) {
        let entry = StagedEntry::new(sig, value, generation);
        self.group(cache).staged.push(entry);
    }

    /// Records that this session mutated data cached in `cache`.
    pub fn mark_dirty(&mut self, cache: &Arc<L2Cache>) {
        self.group(cache).dirty = true;
    }

    pub fn is_dirty(&self, cache: &L2Cache) -> bool {
        self.groups.get(cache.id()).is_some_and(|g| g.dirty)
    }

    /// True if any cache has been dirtied.
    pub fn any_dirty(&self) -> bool {
        self.groups.values().any(|g| g.dirty)
    }

    pub fn staged_len(&self) -> usize {
        self.groups.values().map(|g| g.staged.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    // == Commit ==
    /// Applies the log and empties it.
    ///
    /// If anything was mutated, every dirty cache is invalidated and all staged
    /// reads are dropped. Otherwise each cache is flushed with its staged reads.
    pub fn commit(&mut self) -> CommitOutcome {
        let groups = std::mem::take(&mut self.groups);
        let mut outcome = CommitOutcome::default();

        if groups.values().any(|g| g.dirty) {
            for group in groups.into_values() {
                outcome.discarded += group.staged.len();
                if group.dirty {
                    group.cache.invalidate_all();
                    outcome.invalidated += 1;
                }
            }
            return outcome;
        }

        for group in groups.into_values() {
            let FlushOutcome {
                promoted,
                discarded,
            } = group.cache.flush(group.staged);
            outcome.flushed += 1;
            outcome.promoted += promoted;
            outcome.discarded += discarded;
        }
        outcome
    }

    // == Rollback ==
    /// Drops the log without touching any cache; returns the staged reads dropped.
    pub fn rollback(&mut self) -> usize {
        let discarded = self.staged_len();
        self.groups.clear();
        discarded
    }
}
