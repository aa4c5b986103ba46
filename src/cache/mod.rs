//! Cache Module
//!
//! Two-tier query caching: a session-scoped first-level cache and
//! namespace-scoped second-level caches held by a shared registry.

mod entry;
mod key;
mod local;
mod manager;
mod shared;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, SequenceCounter};
pub use key::{Namespace, Param, QuerySignature};
pub use local::{L1Cache, Origin};
pub use manager::{CacheManager, NamespaceStats};
pub use shared::{FlushOutcome, L2Cache, StagedEntry};
pub use stats::CacheStats;

// == Public Constants ==
/// Default capacity of each second-level cache
pub const DEFAULT_L2_MAX_ENTRIES: usize = 1024;
