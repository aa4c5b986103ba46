//! Flush Interval Task
//!
//! Background task that periodically clears every second-level cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a task that invalidates every second-level cache each `interval`.
///
/// The first clear happens one full interval after spawning. Abort the returned
/// handle to stop the task.
///
/// # Example
/// ```ignore
/// let manager = Arc::new(CacheManager::new(1024));
/// let handle = spawn_flush_interval_task(manager.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_flush_interval_task(manager: Arc<CacheManager>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache flush task with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let cleared = manager.invalidate_all();
            if cleared > 0 {
                info!("Flush interval: cleared {} second-level cache(s)", cleared);
            } else {
                debug!("Flush interval: no caches registered");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Namespace, QuerySignature};
    use serde_json::json;

    #[tokio::test]
    async fn test_flush_task_clears_caches() {
        let manager = Arc::new(CacheManager::new(16));
        let cache = manager.resolve(&Namespace::from("mapper.StudentMapper"));
        let sig = QuerySignature::new("mapper.StudentMapper", "getStudentById", "SELECT").param(1);
        cache.flush(vec![cache.stage(sig, json!({"id": 1}))]);
        assert_eq!(cache.len(), 1);

        let handle = spawn_flush_interval_task(manager.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.is_empty());
        assert!(cache.generation() >= 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_flush_task_can_be_aborted() {
        let manager = Arc::new(CacheManager::new(16));
        let handle = spawn_flush_interval_task(manager, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
