//! Configuration Module
//!
//! Loads cache settings and server options from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::cache::{Namespace, DEFAULT_L2_MAX_ENTRIES};

// == Local Cache Scope ==
/// Retention of the first-level cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalCacheScope {
    /// Entries live until commit, rollback, close or a mutation
    #[default]
    Session,
    /// Entries are dropped after every statement
    Statement,
}

impl FromStr for LocalCacheScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SESSION" => Ok(LocalCacheScope::Session),
            "STATEMENT" => Ok(LocalCacheScope::Statement),
            other => Err(format!("unknown local cache scope '{}'", other)),
        }
    }
}

impl fmt::Display for LocalCacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalCacheScope::Session => f.write_str("SESSION"),
            LocalCacheScope::Statement => f.write_str("STATEMENT"),
        }
    }
}

/// Cache and server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Globally enables the second-level caches
    pub cache_enabled: bool,
    /// First-level cache retention
    pub local_cache_scope: LocalCacheScope,
    /// Capacity of each second-level cache
    pub l2_max_entries: usize,
    /// Interval in seconds for clearing every second-level cache, 0 = never
    pub flush_interval: u64,
    /// Namespace aliases as (namespace, target) pairs
    pub cache_refs: Vec<(Namespace, Namespace)>,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - `true`/`false` (default: true)
    /// - `LOCAL_CACHE_SCOPE` - `SESSION` or `STATEMENT` (default: SESSION)
    /// - `L2_MAX_ENTRIES` - Capacity per second-level cache (default: 1024)
    /// - `FLUSH_INTERVAL` - Seconds between full clears, 0 disables (default: 0)
    /// - `CACHE_REFS` - Comma separated `namespace=target` pairs (default: none)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_enabled: parse_var("CACHE_ENABLED").unwrap_or(defaults.cache_enabled),
            local_cache_scope: parse_var("LOCAL_CACHE_SCOPE")
                .unwrap_or(defaults.local_cache_scope),
            l2_max_entries: parse_var("L2_MAX_ENTRIES").unwrap_or(defaults.l2_max_entries),
            flush_interval: parse_var("FLUSH_INTERVAL").unwrap_or(defaults.flush_interval),
            cache_refs: env::var("CACHE_REFS")
                .map(|v| parse_cache_refs(&v))
                .unwrap_or_default(),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            local_cache_scope: LocalCacheScope::Session,
            l2_max_entries: DEFAULT_L2_MAX_ENTRIES,
            flush_interval: 0,
            cache_refs: Vec::new(),
            server_port: 3000,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "localCacheScope={}, cacheEnabled={}, l2MaxEntries={}, flushInterval={}s",
            self.local_cache_scope, self.cache_enabled, self.l2_max_entries, self.flush_interval
        )?;
        for (namespace, target) in &self.cache_refs {
            write!(f, ", cacheRef[{} -> {}]", namespace, target)?;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Parses `a=b,c=d` into namespace pairs, skipping malformed items.
fn parse_cache_refs(raw: &str) -> Vec<(Namespace, Namespace)> {
    raw.split(',')
        .filter_map(|pair| {
            let (namespace, target) = pair.split_once('=')?;
            let (namespace, target) = (namespace.trim(), target.trim());
            if namespace.is_empty() || target.is_empty() {
                return None;
            }
            Some((Namespace::from(namespace), Namespace::from(target)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.cache_enabled);
        assert_eq!(config.local_cache_scope, LocalCacheScope::Session);
        assert_eq!(config.l2_max_entries, 1024);
        assert_eq!(config.flush_interval, 0);
        assert!(config.cache_refs.is_empty());
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_local_cache_scope_parse() {
        assert_eq!("session".parse::<LocalCacheScope>(), Ok(LocalCacheScope::Session));
        assert_eq!(" STATEMENT ".parse::<LocalCacheScope>(), Ok(LocalCacheScope::Statement));
        assert!("global".parse::<LocalCacheScope>().is_err());
    }

    #[test]
    fn test_parse_cache_refs() {
        let refs = parse_cache_refs("mapper.ClassMapper=mapper.StudentMapper, bad, =x,a = b");
        assert_eq!(
            refs,
            vec![
                (Namespace::from("mapper.ClassMapper"), Namespace::from("mapper.StudentMapper")),
                (Namespace::from("a"), Namespace::from("b")),
            ]
        );
    }

    #[test]
    fn test_display_reports_cache_settings() {
        let text = Config::default().to_string();
        assert!(text.contains("localCacheScope=SESSION"));
        assert!(text.contains("cacheEnabled=true"));
    }
}
