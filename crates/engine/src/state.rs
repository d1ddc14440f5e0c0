//! Shared service state.
//!
//! All process-wide mutable state is held here explicitly and injected
//! into services: the database pool, the metadata source, the high-load
//! flag, and an advisory per-video count cache. The cache is never a
//! source of correctness, only of staleness, and supports explicit
//! invalidation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::metadata::VideoMetadataSource;
use openskip_db::DbPool;

/// Default freshness window for cached aggregate counts.
pub const DEFAULT_COUNT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Shared state available to all engine services.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct ServiceState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Video metadata lookup (external collaborator).
    pub metadata: Arc<dyn VideoMetadataSource>,
    /// Advisory per-video visible-segment counts.
    pub counts: Arc<CountCache>,
    high_load: Arc<AtomicBool>,
}

impl ServiceState {
    pub fn new(pool: DbPool, metadata: Arc<dyn VideoMetadataSource>) -> Self {
        ServiceState {
            pool,
            metadata,
            counts: Arc::new(CountCache::new(DEFAULT_COUNT_CACHE_TTL)),
            high_load: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Toggle degraded mode: under high load, aggregate reads are served
    /// from cache only and fresh reads are refused.
    pub fn set_high_load(&self, high_load: bool) {
        self.high_load.store(high_load, Ordering::Relaxed);
    }

    pub fn is_high_load(&self) -> bool {
        self.high_load.load(Ordering::Relaxed)
    }
}

/// TTL cache of per-video aggregate counts with explicit invalidation.
pub struct CountCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (i64, Instant)>>,
}

impl CountCache {
    pub fn new(ttl: Duration) -> Self {
        CountCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// A cached count, if present and still fresh.
    pub async fn get(&self, key: &str) -> Option<i64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(_, stored_at)| stored_at.elapsed() < self.ttl)
            .map(|(count, _)| *count)
    }

    pub async fn put(&self, key: &str, count: i64) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (count, Instant::now()));
    }

    /// Drop one video's cached count (called after writes to it).
    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    /// Administrative clear-cache operation.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}
