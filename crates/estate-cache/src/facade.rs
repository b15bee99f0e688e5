//! Read-through and write-through entry points.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use estate_core::{PropertyId, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::backend::{CacheBackend, MemoryBackend, RedisBackend};
use crate::category::{CacheCategory, TtlPolicy};
use crate::config::{BackendKind, CacheSettings};
use crate::error::CacheError;
use crate::invalidation::{InvalidationPolicy, InvalidationResult, WriteOperation};
use crate::keys::{KeyDeriver, KeySource};
use crate::metrics::CacheMetrics;
use crate::outcome::CacheOutcome;
use crate::store::CacheStore;

/// How a read was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache.
    Hit,
    /// Loaded from the data source and stored.
    Miss,
    /// Loaded from the data source without touching the cache.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value returned by [`CacheFacade::read_through`].
#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub value: T,
    pub status: CacheStatus,
    pub warnings: Vec<CacheError>,
}

impl<T> ReadOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadOutcome<U> {
        ReadOutcome {
            value: f(self.value),
            status: self.status,
            warnings: self.warnings,
        }
    }
}

/// What a mutation reports back after it commits.
#[derive(Debug, Clone)]
pub struct Committed<R> {
    pub value: R,
    pub property_id: Option<PropertyId>,
    pub owner_id: Option<UserId>,
}

impl<R> Committed<R> {
    pub fn new(value: R) -> Self {
        Self {
            value,
            property_id: None,
            owner_id: None,
        }
    }

    pub fn with_property(mut self, id: PropertyId) -> Self {
        self.property_id = Some(id);
        self
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner_id = Some(owner);
        self
    }
}

/// Value returned by [`CacheFacade::write_through`].
#[derive(Debug, Clone)]
pub struct WriteOutcome<R> {
    pub value: R,
    /// The operation with every identifier learned from the commit.
    pub operation: WriteOperation,
    pub invalidation: InvalidationResult,
    /// Purges that did not complete. The write itself succeeded.
    pub warnings: Vec<CacheError>,
}

impl<R> WriteOutcome<R> {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// The cache as seen by request handlers.
///
/// # Examples
///
/// ```no_run
/// use estate_cache::{CacheCategory, CacheFacade, KeySource};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = CacheFacade::in_memory();
/// let listing = cache
///     .read_through(CacheCategory::AllProperties, KeySource::Singleton, || async {
///         Ok::<_, std::io::Error>(vec!["PROP0001".to_string()])
///     })
///     .await
///     .unwrap();
/// println!("{} ({})", listing.value.len(), listing.status);
/// # }
/// ```
#[derive(Clone)]
pub struct CacheFacade {
    store: CacheStore,
    ttl: TtlPolicy,
    policy: InvalidationPolicy,
}

impl CacheFacade {
    pub fn new(store: CacheStore, ttl: TtlPolicy) -> Self {
        Self {
            store,
            ttl,
            policy: InvalidationPolicy::new(),
        }
    }

    /// Facade over a default in-process backend.
    pub fn in_memory() -> Self {
        Self::new(
            CacheStore::new(Arc::new(MemoryBackend::default())),
            TtlPolicy::default(),
        )
    }

    /// Builds the backend selected in `settings`.
    ///
    /// Does not connect; only a malformed Redis URL fails here.
    pub fn from_settings(settings: &CacheSettings, metrics: CacheMetrics) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match settings.backend {
            BackendKind::Memory => Arc::new(MemoryBackend::with_metrics(
                settings.max_capacity,
                metrics.clone(),
            )),
            BackendKind::Redis => Arc::new(RedisBackend::new(
                &settings.redis_url,
                settings.connect_timeout(),
                settings.reconnect_backoff(),
            )?),
        };

        info!(
            backend = backend.name(),
            timeout_ms = settings.operation_timeout_ms,
            "Cache backend configured"
        );

        let store = CacheStore::new(backend)
            .with_timeout(settings.operation_timeout())
            .with_metrics(metrics);

        Ok(Self::new(store, settings.ttl.to_policy()))
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    pub fn metrics(&self) -> &CacheMetrics {
        self.store.metrics()
    }

    /// Returns the cached value for `category`/`source`, or runs `loader`
    /// and caches what it returns.
    ///
    /// Loader errors are returned unchanged and nothing is cached for them.
    /// Cache failures never fail the read: an unreachable backend turns the
    /// call into a [`CacheStatus::Bypass`] and skips the store step.
    pub async fn read_through<T, E, F, Fut>(
        &self,
        category: CacheCategory,
        source: KeySource<'_>,
        loader: F,
    ) -> Result<ReadOutcome<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = match KeyDeriver::derive(category, source) {
            Ok(key) => key,
            Err(e) => {
                self.store.metrics().record_degraded("derive_key");
                warn!(category = %category, error = %e, "Cannot derive cache key, bypassing cache");
                let value = loader().await?;
                return Ok(ReadOutcome {
                    value,
                    status: CacheStatus::Bypass,
                    warnings: vec![e],
                });
            },
        };

        let (cached, mut warnings) = self.store.get::<T>(key.as_str()).await.into_parts();
        if let Some(value) = cached {
            return Ok(ReadOutcome {
                value,
                status: CacheStatus::Hit,
                warnings,
            });
        }

        // Si el backend esta caido no tiene sentido intentar el set
        let backend_down = warnings.iter().any(CacheError::is_transient);

        let value = loader().await?;

        let status = if backend_down {
            CacheStatus::Bypass
        } else {
            let stored = self
                .store
                .set(key.as_str(), &value, self.ttl.ttl(category))
                .await;
            warnings.extend(stored.into_parts().1);
            CacheStatus::Miss
        };

        debug!(key = %key, status = %status, "Read through cache");

        Ok(ReadOutcome {
            value,
            status,
            warnings,
        })
    }

    /// Runs `mutation` and, once it has committed, purges every key it made
    /// stale.
    ///
    /// A failed mutation is returned unchanged and leaves the cache alone.
    /// A failed purge does not fail the write; it is reported in
    /// [`WriteOutcome::warnings`].
    pub async fn write_through<R, E, F, Fut>(
        &self,
        operation: WriteOperation,
        mutation: F,
    ) -> Result<WriteOutcome<R>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Committed<R>, E>>,
    {
        let committed = mutation().await?;
        let operation = operation.complete_with(committed.property_id, committed.owner_id);

        let patterns = self.policy.keys_to_invalidate(&operation);
        let (invalidation, warnings) = self.purge(patterns).await.into_parts();

        info!(
            operation = %operation.kind(),
            property_id = ?operation.property_id().map(PropertyId::as_str),
            invalidated = invalidation.count,
            failed = warnings.len(),
            "Write committed, cache invalidated"
        );

        Ok(WriteOutcome {
            value: committed.value,
            operation,
            invalidation,
            warnings,
        })
    }

    /// Purges every listing category.
    pub async fn invalidate_property_caches(&self) -> CacheOutcome<InvalidationResult> {
        let patterns = self
            .policy
            .all_property_patterns()
            .iter()
            .map(|p| p.to_string())
            .collect();
        let outcome = self.purge(patterns).await;
        info!(invalidated = outcome.value().count, "Property caches invalidated");
        outcome
    }

    /// Empties the backend.
    pub async fn flush_all(&self) -> CacheOutcome<()> {
        let outcome = self.store.flush_all().await;
        if !outcome.is_degraded() {
            info!(backend = self.store.backend_name(), "Cache flushed");
        }
        outcome
    }

    /// Checks that the backend is reachable.
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.store.ping().await
    }

    async fn purge(&self, patterns: Vec<String>) -> CacheOutcome<InvalidationResult> {
        let mut outcome = CacheOutcome::clean(InvalidationResult::default());
        let mut count = 0;

        for pattern in &patterns {
            let removed = if is_glob(pattern) {
                self.store.delete_pattern(pattern).await
            } else {
                self.store.delete(pattern).await.map(usize::from)
            };

            let (removed, failures) = removed.into_parts();
            count += removed;
            for failure in failures {
                outcome.push_warning(CacheError::Invalidation {
                    pattern: pattern.clone(),
                    reason: failure.to_string(),
                });
            }
        }

        outcome.map(|_| InvalidationResult { count, patterns })
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use estate_core::FilterSet;

    fn failing_facade() -> CacheFacade {
        let backend =
            RedisBackend::new("redis://127.0.0.1:1", Duration::from_millis(100), Duration::from_secs(60))
                .unwrap();
        CacheFacade::new(
            CacheStore::new(Arc::new(backend)).with_timeout(Duration::from_millis(300)),
            TtlPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = CacheFacade::in_memory();
        let calls = &AtomicUsize::new(0);
        let load = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec![1, 2, 3])
        };

        let first = cache
            .read_through(CacheCategory::AllProperties, KeySource::Singleton, load)
            .await
            .unwrap();
        let second = cache
            .read_through(CacheCategory::AllProperties, KeySource::Singleton, load)
            .await
            .unwrap();

        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.value, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_loader_error_is_not_cached() {
        let cache = CacheFacade::in_memory();

        let err = cache
            .read_through(CacheCategory::AllProperties, KeySource::Singleton, || async {
                Err::<Vec<i32>, _>("database down")
            })
            .await
            .unwrap_err();
        assert_eq!(err, "database down");

        let next = cache
            .read_through(CacheCategory::AllProperties, KeySource::Singleton, || async {
                Ok::<_, &str>(vec![7])
            })
            .await
            .unwrap();
        assert_eq!(next.status, CacheStatus::Miss);
        assert_eq!(next.value, vec![7]);
    }

    #[tokio::test]
    async fn test_wrong_key_shape_bypasses_cache() {
        let cache = CacheFacade::in_memory();
        let filters = FilterSet::new();

        let read = cache
            .read_through(CacheCategory::PropertyDetail, KeySource::Filters(&filters), || async {
                Ok::<_, String>(1)
            })
            .await
            .unwrap();

        assert_eq!(read.status, CacheStatus::Bypass);
        assert!(matches!(read.warnings[0], CacheError::KeyShape { .. }));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let cache = CacheFacade::in_memory();
        let _ = cache
            .read_through(CacheCategory::AllProperties, KeySource::Singleton, || async {
                Ok::<_, String>(vec![1])
            })
            .await
            .unwrap();

        let result = cache
            .write_through(WriteOperation::create(), || async {
                Err::<Committed<()>, _>("constraint violated".to_string())
            })
            .await;
        assert!(result.is_err());

        let read = cache
            .read_through(CacheCategory::AllProperties, KeySource::Singleton, || async {
                Ok::<_, String>(vec![2])
            })
            .await
            .unwrap();
        assert_eq!(read.status, CacheStatus::Hit);
        assert_eq!(read.value, vec![1]);
    }

    #[tokio::test]
    async fn test_write_learns_ids_from_commit() {
        let cache = CacheFacade::in_memory();

        let written = cache
            .write_through(WriteOperation::create(), || async {
                Ok::<_, String>(
                    Committed::new("ok")
                        .with_property(PropertyId::new("PROP0100"))
                        .with_owner(UserId::new("u-9")),
                )
            })
            .await
            .unwrap();

        assert_eq!(written.value, "ok");
        assert_eq!(written.operation.owner_id(), Some(&UserId::new("u-9")));
        assert!(
            written
                .invalidation
                .patterns
                .contains(&"properties:user:u-9".to_string())
        );
        assert!(!written.is_degraded());
    }

    #[tokio::test]
    async fn test_backend_down_read_is_bypass() {
        let cache = failing_facade();

        let read = cache
            .read_through(CacheCategory::AllProperties, KeySource::Singleton, || async {
                Ok::<_, String>(vec![42])
            })
            .await
            .unwrap();

        assert_eq!(read.value, vec![42]);
        assert_eq!(read.status, CacheStatus::Bypass);
        assert!(read.is_degraded());
    }

    #[tokio::test]
    async fn test_backend_down_write_still_succeeds() {
        let cache = failing_facade();

        let written = cache
            .write_through(WriteOperation::update(PropertyId::new("PROP0001")), || async {
                Ok::<_, String>(Committed::new(5))
            })
            .await
            .unwrap();

        assert_eq!(written.value, 5);
        assert_eq!(written.invalidation.count, 0);
        assert!(
            written
                .warnings
                .iter()
                .all(|w| matches!(w, CacheError::Invalidation { .. }))
        );
        assert_eq!(written.warnings.len(), written.invalidation.patterns.len());
    }

    #[test]
    fn test_is_glob() {
        assert!(is_glob("properties:*"));
        assert!(!is_glob("property:detail:PROP0001"));
    }
}
