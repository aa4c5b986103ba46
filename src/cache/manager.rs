//! Cache Manager Module
//!
//! Registry mapping each namespace to its second-level cache. Namespaces bound
//! with a cache-ref share the target's cache instance.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

use crate::cache::{CacheStats, L2Cache, Namespace};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Namespace Stats ==
/// Statistics for one distinct cache and the namespaces bound to it.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceStats {
    /// Namespace that owns the cache
    pub cache: String,
    /// Every namespace resolving to this cache, owner included
    pub namespaces: Vec<String>,
    pub stats: CacheStats,
}

// == Cache Manager ==
/// Registry of second-level caches.
///
/// Created once before the first session and shared by `Arc`.
#[derive(Debug)]
pub struct CacheManager {
    max_entries: usize,
    caches: RwLock<HashMap<Namespace, Arc<L2Cache>>>,
}

impl CacheManager {
    // == Constructor ==
    /// Creates an empty registry whose caches hold at most `max_entries` each.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry and applies the configured cache-refs.
    ///
    /// Refs may be listed in any order: a ref whose target is itself a ref is
    /// applied after that target. A cycle is an `AliasConflict`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let manager = Self::new(config.l2_max_entries);
        let mut pending = config.cache_refs.clone();

        while !pending.is_empty() {
            let (ready, waiting): (Vec<_>, Vec<_>) = pending
                .iter()
                .cloned()
                .partition(|(_, target)| !pending.iter().any(|(ns, _)| ns == target));

            if ready.is_empty() {
                let cycle: Vec<String> = waiting.iter().map(|(ns, _)| ns.to_string()).collect();
                return Err(CacheError::AliasConflict(format!(
                    "cache-refs form a cycle: {}",
                    cycle.join(", ")
                )));
            }

            for (namespace, target) in ready {
                manager.register_ref(namespace, target)?;
            }
            pending = waiting;
        }
        Ok(manager)
    }

    // == Register Ref ==
    /// Binds `namespace` to the cache used by `target`.
    pub fn register_ref(
        &self,
        namespace: impl Into<Namespace>,
        target: impl Into<Namespace>,
    ) -> Result<Arc<L2Cache>> {
        let namespace = namespace.into();
        let target = self.resolve(&target.into());

        let mut caches = self.caches.write();
        if let Some(existing) = caches.get(&namespace) {
            if Arc::ptr_eq(existing, &target) {
                return Ok(target);
            }
            return Err(CacheError::AliasConflict(format!(
                "namespace '{}' is already bound to the cache of '{}'",
                namespace,
                existing.id()
            )));
        }

        info!("Namespace '{}' references the cache of '{}'", namespace, target.id());
        caches.insert(namespace, target.clone());
        Ok(target)
    }

    // == Resolve ==
    /// Returns the cache for `namespace`, registering it on first use.
    pub fn resolve(&self, namespace: &Namespace) -> Arc<L2Cache> {
        if let Some(cache) = self.caches.read().get(namespace) {
            return cache.clone();
        }

        let mut caches = self.caches.write();
        caches
            .entry(namespace.clone())
            .or_insert_with(|| {
                info!("Created second-level cache for namespace '{}'", namespace);
                Arc::new(L2Cache::new(namespace.clone(), self.max_entries))
            })
            .clone()
    }

    /// Returns the cache for `namespace` if it has been registered.
    pub fn get(&self, namespace: &Namespace) -> Option<Arc<L2Cache>> {
        self.caches.read().get(namespace).cloned()
    }

    // == Distinct Caches ==
    /// Every distinct cache instance, ordered by owning namespace.
    pub fn caches(&self) -> Vec<Arc<L2Cache>> {
        let caches = self.caches.read();
        let mut distinct: BTreeMap<Namespace, Arc<L2Cache>> = BTreeMap::new();
        for cache in caches.values() {
            distinct
                .entry(cache.id().clone())
                .or_insert_with(|| cache.clone());
        }
        distinct.into_values().collect()
    }

    // == Stats ==
    pub fn stats(&self) -> Vec<NamespaceStats> {
        let caches = self.caches.read();
        let mut grouped: BTreeMap<Namespace, (Arc<L2Cache>, Vec<String>)> = BTreeMap::new();
        for (namespace, cache) in caches.iter() {
            grouped
                .entry(cache.id().clone())
                .or_insert_with(|| (cache.clone(), Vec::new()))
                .1
                .push(namespace.to_string());
        }

        grouped
            .into_iter()
            .map(|(owner, (cache, mut namespaces))| {
                namespaces.sort();
                NamespaceStats {
                    cache: owner.to_string(),
                    namespaces,
                    stats: cache.stats(),
                }
            })
            .collect()
    }

    // == Reset ==
    /// Invalidates the cache behind `namespace`.
    pub fn reset(&self, namespace: &Namespace) -> Result<()> {
        let cache = self
            .get(namespace)
            .ok_or_else(|| CacheError::NotFound(format!("namespace '{}'", namespace)))?;
        cache.invalidate_all();
        info!("Reset second-level cache [{}] via '{}'", cache.id(), namespace);
        Ok(())
    }

    /// Invalidates every cache; returns how many distinct caches were cleared.
    pub fn invalidate_all(&self) -> usize {
        let caches = self.caches();
        for cache in &caches {
            cache.invalidate_all();
        }
        caches.len()
    }
}
