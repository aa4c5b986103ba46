//! Session Module
//!
//! A session resolves reads through its first-level cache, then the shared
//! second-level cache, then the data source. Reads it loads are staged and
//! reach the second-level cache only when the session commits or closes.

mod factory;
mod pending;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheManager, L1Cache, L2Cache, Origin, QuerySignature};
use crate::config::{Config, LocalCacheScope};
use crate::datasource::{DataSource, Mutation, Row};
use crate::error::{CacheError, Result};

pub use factory::SessionFactory;
pub use pending::{CommitOutcome, PendingWrites};

// == Session State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Committed,
    RolledBack,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Open => "OPEN",
            SessionState::Committed => "COMMITTED",
            SessionState::RolledBack => "ROLLED_BACK",
            SessionState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

// == Session ==
/// One unit of work against the data source.
///
/// Not shared between tasks; every method takes `&mut self`.
pub struct Session {
    id: u64,
    autocommit: bool,
    state: SessionState,
    config: Arc<Config>,
    local: L1Cache,
    pending: PendingWrites,
    manager: Arc<CacheManager>,
    data_source: Arc<dyn DataSource>,
}

impl Session {
    pub(crate) fn new(
        id: u64,
        autocommit: bool,
        config: Arc<Config>,
        manager: Arc<CacheManager>,
        data_source: Arc<dyn DataSource>,
    ) -> Self {
        debug!("Opened session {} (autocommit={})", id, autocommit);
        Self {
            id,
            autocommit,
            state: SessionState::Open,
            config,
            local: L1Cache::new(),
            pending: PendingWrites::new(),
            manager,
            data_source,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True if the session has uncommitted mutations.
    pub fn is_dirty(&self) -> bool {
        self.pending.any_dirty()
    }

    /// The session's first-level cache.
    pub fn local_cache(&self) -> &L1Cache {
        &self.local
    }

    /// Number of reads waiting for commit.
    pub fn staged_len(&self) -> usize {
        self.pending.staged_len()
    }

    // == Query ==
    /// Resolves a read: first-level cache, then second-level cache, then the
    /// data source.
    pub async fn query(&mut self, sig: &QuerySignature) -> Result<Row> {
        self.begin()?;

        if let Some(value) = self.local.get(sig) {
            debug!("Session {}: L1 hit for {}", self.id, sig);
            self.end_statement();
            return Ok(value);
        }

        // The generation seen at the miss, not after the load, decides whether
        // this read may be promoted.
        let mut shared = None;
        if let Some(cache) = self.shared_cache(sig) {
            let (hit, generation) = cache.lookup(sig);
            if let Some(value) = hit {
                debug!("Session {}: L2 hit for {}", self.id, sig);
                let origin = Origin { cache, generation };
                self.local.put_from(sig.clone(), value.clone(), origin);
                self.end_statement();
                return Ok(value);
            }
            shared = Some((cache, generation));
        }

        debug!("Session {}: cache miss for {}, querying data source", self.id, sig);
        let value = self.data_source.query(sig).await.map_err(|e| {
            warn!("Session {}: query {} failed: {}", self.id, sig, e);
            e
        })?;

        self.local.put(sig.clone(), value.clone());
        if let Some((cache, generation)) = &shared {
            self.pending
                .stage(cache, sig.clone(), value.clone(), *generation);
        }
        self.end_statement();
        Ok(value)
    }

    // == Mutate ==
    /// Executes a mutation and returns the affected row count.
    ///
    /// Clears the first-level cache and marks the namespace's second-level
    /// cache for invalidation at commit. Autocommit sessions commit right away.
    pub async fn mutate(&mut self, mutation: &Mutation) -> Result<u64> {
        self.begin()?;

        let affected = self.data_source.execute(mutation).await.map_err(|e| {
            warn!("Session {}: execute {} failed: {}", self.id, mutation, e);
            e
        })?;

        self.local.clear();
        if self.config.cache_enabled {
            let cache = self.manager.resolve(mutation.namespace());
            self.pending.mark_dirty(&cache);
        }
        debug!(
            "Session {}: {} affected {} row(s)",
            self.id, mutation, affected
        );

        if self.autocommit {
            self.commit()?;
        }
        Ok(affected)
    }

    // == Commit ==
    /// Invalidates dirtied caches, or promotes staged reads if nothing was
    /// mutated, then clears the first-level cache.
    pub fn commit(&mut self) -> Result<CommitOutcome> {
        self.ensure_not_closed("commit")?;
        let outcome = self.finish_unit();
        self.state = SessionState::Committed;
        Ok(outcome)
    }

    // == Rollback ==
    /// Drops staged reads and dirty marks without touching shared caches.
    pub fn rollback(&mut self) -> Result<()> {
        self.ensure_not_closed("rollback")?;
        let discarded = self.pending.rollback();
        self.local.clear();
        self.state = SessionState::RolledBack;
        info!(
            "Session {} rolled back, {} staged read(s) discarded",
            self.id, discarded
        );
        Ok(())
    }

    // == Close ==
    /// Commits any open unit of work for cache visibility, then releases the
    /// first-level cache.
    pub fn close(&mut self) -> Result<CommitOutcome> {
        self.ensure_not_closed("close")?;
        let outcome = if self.state == SessionState::Open {
            self.finish_unit()
        } else {
            CommitOutcome::default()
        };
        self.state = SessionState::Closed;
        debug!("Closed session {}", self.id);
        Ok(outcome)
    }

    fn finish_unit(&mut self) -> CommitOutcome {
        let outcome = self.pending.commit();
        self.local.clear();
        info!(
            "Session {} committed: {} cache(s) invalidated, {} flushed, {} read(s) promoted, {} discarded",
            self.id, outcome.invalidated, outcome.flushed, outcome.promoted, outcome.discarded
        );
        outcome
    }

    /// Checks the session is usable and reopens it after a commit or rollback.
    fn begin(&mut self) -> Result<()> {
        self.ensure_not_closed("execute a statement on")?;
        self.state = SessionState::Open;
        Ok(())
    }

    fn ensure_not_closed(&self, action: &str) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(CacheError::IllegalState(format!(
                "cannot {} closed session {}",
                action, self.id
            )));
        }
        Ok(())
    }

    fn end_statement(&mut self) {
        if self.config.local_cache_scope == LocalCacheScope::Statement {
            self.local.clear();
        }
    }

    /// The second-level cache to consult for `sig`, if any.
    ///
    /// None when caching is disabled or this session has dirtied the cache.
    fn shared_cache(&self, sig: &QuerySignature) -> Option<Arc<L2Cache>> {
        if !self.config.cache_enabled {
            return None;
        }
        let cache = self.manager.resolve(sig.namespace());
        if self.pending.is_dirty(&cache) {
            return None;
        }
        Some(cache)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("autocommit", &self.autocommit)
            .field("state", &self.state)
            .field("local_entries", &self.local.len())
            .field("staged", &self.pending.staged_len())
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state != SessionState::Closed && !self.pending.is_empty() {
            warn!(
                "Session {} dropped without close; {} staged read(s) discarded",
                self.id,
                self.pending.staged_len()
            );
        }
    }
}
