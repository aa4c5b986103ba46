//! Produces sessions sharing one configuration, cache registry and data source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::Session;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::datasource::DataSource;
use crate::error::Result;

/// Opens sessions.
///
/// The cache registry must exist before the first session; build it with
/// [`CacheManager::from_config`] or let [`SessionFactory::from_config`] do so.
pub struct SessionFactory {
    config: Arc<Config>,
    manager: Arc<CacheManager>,
    data_source: Arc<dyn DataSource>,
    next_id: AtomicU64,
}

impl SessionFactory {
    pub fn new(
        config: Config,
        manager: Arc<CacheManager>,
        data_source: Arc<dyn DataSource>,
    ) -> Self {
        info!("Session factory ready: {}", config);
        Self {
            config: Arc::new(config),
            manager,
            data_source,
            next_id: AtomicU64::new(1),
        }
    }

    /// Builds the cache registry from `config` and wraps it in a factory.
    pub fn from_config(config: Config, data_source: Arc<dyn DataSource>) -> Result<Self> {
        let manager = Arc::new(CacheManager::from_config(&config)?);
        Ok(Self::new(config, manager, data_source))
    }

    // == Open Session ==
    pub fn open_session(&self, autocommit: bool) -> Session {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Session::new(
            id,
            autocommit,
            self.config.clone(),
            self.manager.clone(),
            self.data_source.clone(),
        )
    }

    pub fn configuration(&self) -> &Config {
        &self.config
    }

    pub fn cache_manager(&self) -> &Arc<CacheManager> {
        &self.manager
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalCacheScope;
    use crate::datasource::InMemoryDataSource;

    #[test]
    fn test_session_ids_are_unique() {
        let factory =
            SessionFactory::from_config(Config::default(), Arc::new(InMemoryDataSource::new()))
                .unwrap();
        let a = factory.open_session(true);
        let b = factory.open_session(false);
        assert_ne!(a.id(), b.id());
        assert!(a.autocommit());
        assert!(!b.autocommit());
    }

    #[test]
    fn test_default_cache_configuration() {
        let factory =
            SessionFactory::from_config(Config::default(), Arc::new(InMemoryDataSource::new()))
                .unwrap();
        let config = factory.configuration();
        assert_eq!(config.local_cache_scope, LocalCacheScope::Session);
        assert!(config.cache_enabled);
    }
}
