//! Cache Entry Module
//!
//! Defines the value stored by both cache tiers.

use crate::datasource::Row;

// == Cache Entry ==
/// A cached query result together with its insertion order.
///
/// Entries carry no expiry; both tiers drop them wholesale on lifecycle events.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached result row
    pub value: Row,
    /// Monotonic insertion sequence within the owning cache
    pub sequence: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(value: Row, sequence: u64) -> Self {
        Self { value, sequence }
    }
}

// == Sequence Counter ==
/// Hands out insertion sequence numbers for one cache.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: u64,
}

impl SequenceCounter {
    pub fn next(&mut self) -> u64 {
        let seq = self.next;
        self.next += 1;
        seq
    }
}
