//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::category::{CacheCategory, TtlPolicy};

/// Which backend the cache runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process moka cache.
    #[default]
    Memory,
    /// Shared Redis server.
    Redis,
}

/// Cache settings, usually read from the `cache` section of the server
/// configuration. Every field has a default, so an empty section is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: BackendKind,

    /// Used when `backend` is `redis`.
    pub redis_url: String,

    /// Upper bound for a single backend call.
    pub operation_timeout_ms: u64,

    /// Upper bound for opening the Redis connection.
    pub connect_timeout_ms: u64,

    /// Time to wait after a failed connect before trying again.
    pub reconnect_backoff_ms: u64,

    /// Maximum entries held by the memory backend.
    pub max_capacity: u64,

    pub ttl: TtlSettings,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            operation_timeout_ms: 200,
            connect_timeout_ms: 2_000,
            reconnect_backoff_ms: 5_000,
            max_capacity: 10_000,
            ttl: TtlSettings::default(),
        }
    }
}

impl CacheSettings {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}

/// TTL per category, in seconds. Zero disables caching for the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlSettings {
    pub filter_options: u64,
    pub all_properties: u64,
    pub user_properties: u64,
    pub property_detail: u64,
    pub search_results: u64,
}

impl Default for TtlSettings {
    fn default() -> Self {
        let secs = |category: CacheCategory| category.default_ttl().as_secs();
        Self {
            filter_options: secs(CacheCategory::FilterOptions),
            all_properties: secs(CacheCategory::AllProperties),
            user_properties: secs(CacheCategory::UserProperties),
            property_detail: secs(CacheCategory::PropertyDetail),
            search_results: secs(CacheCategory::SearchResults),
        }
    }
}

impl TtlSettings {
    pub fn to_policy(&self) -> TtlPolicy {
        [
            (CacheCategory::FilterOptions, self.filter_options),
            (CacheCategory::AllProperties, self.all_properties),
            (CacheCategory::UserProperties, self.user_properties),
            (CacheCategory::PropertyDetail, self.property_detail),
            (CacheCategory::SearchResults, self.search_results),
        ]
        .into_iter()
        .fold(TtlPolicy::default(), |policy, (category, secs)| {
            policy.with(category, Duration::from_secs(secs))
        })
    }
}
