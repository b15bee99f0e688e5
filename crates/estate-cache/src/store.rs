//! Typed, fault-tolerant access to a cache backend.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::CacheBackend;
use crate::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::outcome::CacheOutcome;

/// Default bound on a single backend call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(200);

/// JSON-encoding wrapper over a [`CacheBackend`].
///
/// No operation here returns an error. A failing backend degrades each call
/// to its neutral result (a miss, a no-op, zero removed keys) and the cause
/// travels as a warning on the returned [`CacheOutcome`].
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    op_timeout: Duration,
    metrics: CacheMetrics,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            op_timeout: DEFAULT_OPERATION_TIMEOUT,
            metrics: CacheMetrics::new(),
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: CacheMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Reads and decodes `key`.
    ///
    /// A value that fails to decode is treated as a miss and left in place;
    /// the next `set` overwrites it.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheOutcome<Option<T>> {
        let raw = match self.call("get", self.backend.get(key)).await {
            Ok(raw) => raw,
            Err(e) => return self.degrade("get", key, None, e),
        };

        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.metrics.record_hit();
                    debug!(key, "Cache hit");
                    CacheOutcome::clean(Some(value))
                },
                Err(e) => {
                    self.metrics.record_miss();
                    self.degrade("get", key, None, CacheError::serialization(key, e.to_string()))
                },
            },
            None => {
                self.metrics.record_miss();
                debug!(key, "Cache miss");
                CacheOutcome::clean(None)
            },
        }
    }

    /// Encodes and stores `value` under `key` for `ttl`.
    ///
    /// A zero `ttl` stores nothing.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheOutcome<()> {
        if ttl.is_zero() {
            return CacheOutcome::clean(());
        }

        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                return self.degrade("set", key, (), CacheError::serialization(key, e.to_string()));
            },
        };

        match self.call("set", self.backend.set(key, encoded, ttl)).await {
            Ok(()) => CacheOutcome::clean(()),
            Err(e) => self.degrade("set", key, (), e),
        }
    }

    /// Removes `key`. The value reports whether it existed.
    pub async fn delete(&self, key: &str) -> CacheOutcome<bool> {
        match self.call("delete", self.backend.delete(key)).await {
            Ok(removed) => {
                if removed {
                    self.metrics.record_invalidated(1);
                }
                CacheOutcome::clean(removed)
            },
            Err(e) => self.degrade("delete", key, false, e),
        }
    }

    /// Removes every key matching the glob `pattern`. The value is the
    /// number of removed keys.
    pub async fn delete_pattern(&self, pattern: &str) -> CacheOutcome<usize> {
        match self
            .call("delete_pattern", self.backend.delete_pattern(pattern))
            .await
        {
            Ok(removed) => {
                self.metrics.record_invalidated(removed);
                debug!(pattern, removed, "Deleted keys by pattern");
                CacheOutcome::clean(removed)
            },
            Err(e) => self.degrade("delete_pattern", pattern, 0, e),
        }
    }

    /// Removes every entry in the backend.
    pub async fn flush_all(&self) -> CacheOutcome<()> {
        match self.call("flush_all", self.backend.flush_all()).await {
            Ok(()) => CacheOutcome::clean(()),
            Err(e) => self.degrade("flush_all", "*", (), e),
        }
    }

    /// Checks that the backend is reachable.
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.call("ping", self.backend.ping()).await
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                operation,
                millis: self.op_timeout.as_millis() as u64,
            }),
        };
        self.metrics
            .record_operation_duration(operation, start.elapsed());
        result
    }

    fn degrade<T>(
        &self,
        operation: &'static str,
        key: &str,
        fallback: T,
        error: CacheError,
    ) -> CacheOutcome<T> {
        self.metrics.record_degraded(operation);
        warn!(
            operation,
            key,
            backend = self.backend.name(),
            error = %error,
            "Cache operation failed, continuing without cache"
        );
        CacheOutcome::degraded(fallback, error)
    }
}
