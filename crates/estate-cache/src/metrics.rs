//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_cache_metrics() {
    metrics::describe_counter!("estate_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("estate_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "estate_cache_degraded_total",
        "Cache operations that failed and fell back to the data source"
    );
    metrics::describe_counter!(
        "estate_cache_invalidated_total",
        "Total number of keys removed by invalidation"
    );
    metrics::describe_counter!(
        "estate_cache_evictions_total",
        "Total number of in-memory cache evictions"
    );
    metrics::describe_gauge!("estate_cache_entries", "Current number of entries in cache");
    metrics::describe_histogram!(
        "estate_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Recorder de metricas de cache.
///
/// Clones share the same counters, so the store, the backend and the
/// health endpoint all observe one set of numbers.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    degraded: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            degraded: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("estate_cache_hits_total").increment(1);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("estate_cache_misses_total").increment(1);
    }

    /// Registra una operacion que fallo y se degrado.
    pub fn record_degraded(&self, operation: &'static str) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
        counter!("estate_cache_degraded_total", "operation" => operation).increment(1);
    }

    pub fn record_invalidated(&self, count: usize) {
        counter!("estate_cache_invalidated_total").increment(count as u64);
    }

    pub fn record_eviction(&self, reason: &'static str) {
        counter!("estate_cache_evictions_total", "reason" => reason).increment(1);
    }

    pub fn update_entry_count(&self, count: u64) {
        gauge!("estate_cache_entries").set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("estate_cache_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn degraded(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}
