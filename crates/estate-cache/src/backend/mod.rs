//! Key-value backends the cache store runs on.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

mod memory;
mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

/// A key-value store with per-entry expiration.
///
/// Values are already encoded by the time they reach a backend; backends
/// only move strings. Implementations report failures as [`CacheError`]s
/// and never panic on a missing key.
///
/// # Implementors
///
/// - [`MemoryBackend`] - in-process, for single-instance deployments and tests
/// - [`RedisBackend`] - shared across processes over the network
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the stored value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry and its TTL.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removes `key`. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Removes every live key matching the glob `pattern` as one step, so
    /// a concurrent reader sees either all or none of the matches. Returns
    /// the number of removed keys.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Removes every entry.
    async fn flush_all(&self) -> Result<(), CacheError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Name used in logs and errors.
    fn name(&self) -> &str;
}
