//! Estate Cache - read-through cache layer for property listings.
//!
//! - [`KeyDeriver`] turns a category plus parameters into a stable key
//! - [`CacheStore`] wraps a [`CacheBackend`] with encoding, timeouts and
//!   the degrade-on-failure policy
//! - [`InvalidationPolicy`] maps writes to the key patterns they make stale
//! - [`CacheFacade`] ties them together for request handlers
//!
//! The cache is never a correctness dependency: with the backend down every
//! read falls through to its loader and every write still commits.

pub mod backend;
pub mod category;
pub mod config;
pub mod error;
pub mod facade;
pub mod invalidation;
pub mod keys;
pub mod metrics;
pub mod outcome;
pub mod store;

pub use backend::{CacheBackend, MemoryBackend, RedisBackend};
pub use category::{CacheCategory, KeyShape, TtlPolicy};
pub use config::{BackendKind, CacheSettings, TtlSettings};
pub use error::CacheError;
pub use facade::{CacheFacade, CacheStatus, Committed, ReadOutcome, WriteOutcome};
pub use invalidation::{InvalidationPolicy, InvalidationResult, WriteKind, WriteOperation};
pub use keys::{CacheKey, KeyDeriver, KeySource};
pub use metrics::{CacheMetrics, register_cache_metrics};
pub use outcome::CacheOutcome;
pub use store::CacheStore;
