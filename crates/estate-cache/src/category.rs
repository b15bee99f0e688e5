//! Cache categories and their TTL policy.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How keys of a category are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// Exactly one key, equal to the prefix.
    Singleton,
    /// `{prefix}:{identifier}`.
    Identifier,
    /// `{prefix}:{digest of the canonical filter set}`.
    Filters,
}

/// Namespace tag grouping related cache keys under a shared TTL.
///
/// Every category owns a distinct prefix so a single glob pattern can purge
/// exactly one category, or every listing category at once via
/// `properties:*` and `property:*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    /// Distinct facet values for search dropdowns.
    FilterOptions,
    /// The unfiltered listing of every property.
    AllProperties,
    /// Listings owned by one user.
    UserProperties,
    /// A single property by id.
    PropertyDetail,
    /// A page of search results for one filter set.
    SearchResults,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 5] = [
        CacheCategory::FilterOptions,
        CacheCategory::AllProperties,
        CacheCategory::UserProperties,
        CacheCategory::PropertyDetail,
        CacheCategory::SearchResults,
    ];

    /// Key prefix of the category.
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheCategory::FilterOptions => "properties:filter-options",
            CacheCategory::AllProperties => "properties:all",
            CacheCategory::UserProperties => "properties:user",
            CacheCategory::PropertyDetail => "property:detail",
            CacheCategory::SearchResults => "properties:search",
        }
    }

    pub fn shape(&self) -> KeyShape {
        match self {
            CacheCategory::FilterOptions | CacheCategory::AllProperties => KeyShape::Singleton,
            CacheCategory::UserProperties | CacheCategory::PropertyDetail => KeyShape::Identifier,
            CacheCategory::SearchResults => KeyShape::Filters,
        }
    }

    /// Glob pattern matching every key of the category.
    pub fn pattern(&self) -> String {
        match self.shape() {
            KeyShape::Singleton => self.prefix().to_string(),
            KeyShape::Identifier | KeyShape::Filters => format!("{}:*", self.prefix()),
        }
    }

    /// Lifetime applied when no TTL is configured.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(match self {
            CacheCategory::FilterOptions => 3600,
            CacheCategory::AllProperties => 600,
            CacheCategory::UserProperties => 300,
            CacheCategory::PropertyDetail => 1800,
            CacheCategory::SearchResults => 300,
        })
    }

    /// Label used in metrics.
    pub fn label(&self) -> &'static str {
        match self {
            CacheCategory::FilterOptions => "filter_options",
            CacheCategory::AllProperties => "all_properties",
            CacheCategory::UserProperties => "user_properties",
            CacheCategory::PropertyDetail => "property_detail",
            CacheCategory::SearchResults => "search_results",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Per-category time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    filter_options: Duration,
    all_properties: Duration,
    user_properties: Duration,
    property_detail: Duration,
    search_results: Duration,
}

impl TtlPolicy {
    pub fn ttl(&self, category: CacheCategory) -> Duration {
        match category {
            CacheCategory::FilterOptions => self.filter_options,
            CacheCategory::AllProperties => self.all_properties,
            CacheCategory::UserProperties => self.user_properties,
            CacheCategory::PropertyDetail => self.property_detail,
            CacheCategory::SearchResults => self.search_results,
        }
    }

    /// Overrides the TTL of one category.
    pub fn with(mut self, category: CacheCategory, ttl: Duration) -> Self {
        let slot = match category {
            CacheCategory::FilterOptions => &mut self.filter_options,
            CacheCategory::AllProperties => &mut self.all_properties,
            CacheCategory::UserProperties => &mut self.user_properties,
            CacheCategory::PropertyDetail => &mut self.property_detail,
            CacheCategory::SearchResults => &mut self.search_results,
        };
        *slot = ttl;
        self
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            filter_options: CacheCategory::FilterOptions.default_ttl(),
            all_properties: CacheCategory::AllProperties.default_ttl(),
            user_properties: CacheCategory::UserProperties.default_ttl(),
            property_detail: CacheCategory::PropertyDetail.default_ttl(),
            search_results: CacheCategory::SearchResults.default_ttl(),
        }
    }
}
