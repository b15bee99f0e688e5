//! In-process backend using Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use glob::Pattern;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use tokio::sync::RwLock;

use super::CacheBackend;
use crate::error::CacheError;
use crate::metrics::CacheMetrics;

#[derive(Debug, Clone)]
struct StoredValue {
    payload: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Backend en memoria del proceso usando Moka.
/// Safe to share across tasks.
///
/// Bulk operations (`delete_pattern`, `flush_all`) take an exclusive gate
/// that single-key operations share, so readers in this process never
/// observe a half-applied bulk delete.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use estate_cache::{CacheBackend, MemoryBackend};
///
/// # #[tokio::main]
/// # async fn main() {
/// let backend = MemoryBackend::new(10_000);
/// backend
///     .set("properties:all", "[]".to_string(), Duration::from_secs(600))
///     .await
///     .unwrap();
/// assert!(backend.get("properties:all").await.unwrap().is_some());
/// # }
/// ```
pub struct MemoryBackend {
    entries: Cache<String, StoredValue>,
    gate: RwLock<()>,
    metrics: CacheMetrics,
}

impl MemoryBackend {
    /// Creates a backend bounded to `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        Self::with_metrics(max_capacity, CacheMetrics::new())
    }

    /// Creates a backend that reports evictions to `metrics`.
    pub fn with_metrics(max_capacity: u64, metrics: CacheMetrics) -> Self {
        // Cada entry expira con el TTL con el que fue escrita
        let listener_metrics = metrics.clone();
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                listener_metrics.record_eviction(reason);
            })
            .build();

        Self {
            entries,
            gate: RwLock::new(()),
            metrics,
        }
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Runs moka's pending maintenance (expiration, eviction counting).
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let _shared = self.gate.read().await;
        Ok(self
            .entries
            .get(key)
            .await
            .map(|stored| stored.payload.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let _shared = self.gate.read().await;
        self.entries
            .insert(
                key.to_string(),
                StoredValue {
                    payload: Arc::from(value),
                    ttl,
                },
            )
            .await;
        self.metrics.update_entry_count(self.entries.entry_count());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let _shared = self.gate.read().await;
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let matcher =
            Pattern::new(pattern).map_err(|e| CacheError::invalid_pattern(pattern, e.to_string()))?;

        let _exclusive = self.gate.write().await;

        // Snapshot first: the iterator must not be held across removals.
        let matching: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(key, _)| matcher.matches(key))
            .map(|(key, _)| key)
            .collect();

        let mut removed = 0;
        for key in matching {
            if self.entries.remove(key.as_str()).await.is_some() {
                removed += 1;
            }
        }

        self.metrics.update_entry_count(self.entries.entry_count());
        Ok(removed)
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        let _exclusive = self.gate.write().await;
        self.entries.invalidate_all();
        self.metrics.update_entry_count(0);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
