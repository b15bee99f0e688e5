//! Cache key derivation.

use std::borrow::Cow;
use std::fmt;

use estate_core::{FilterSet, PropertyId, UserId};
use sha2::{Digest, Sha256};

use crate::category::{CacheCategory, KeyShape};
use crate::error::CacheError;

/// Identifiers longer than this are hashed instead of embedded.
const MAX_LITERAL_ID_LEN: usize = 64;

/// Bytes of the SHA-256 output kept in a key digest (128 bits).
const DIGEST_BYTES: usize = 16;

/// What a key is derived from.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a> {
    /// Categories holding a single entry.
    Singleton,
    /// Categories keyed by a record or owner identifier.
    Identifier(&'a str),
    /// Categories keyed by search parameters.
    Filters(&'a FilterSet),
}

impl KeySource<'_> {
    fn describe(&self) -> &'static str {
        match self {
            KeySource::Singleton => "no parameters",
            KeySource::Identifier(_) => "an identifier",
            KeySource::Filters(_) => "a filter set",
        }
    }
}

/// A derived cache key.
///
/// The key text is a pure function of the category and the normalized key
/// source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    category: CacheCategory,
    key: String,
}

impl CacheKey {
    pub fn category(&self) -> CacheCategory {
        self.category
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Turns categories plus parameters into stable cache keys.
///
/// # Examples
///
/// ```
/// use estate_cache::{CacheCategory, KeyDeriver, KeySource};
/// use estate_core::FilterSet;
///
/// let a = FilterSet::from_params([("state", "CA"), ("minPrice", "100000")]);
/// let b = FilterSet::from_params([("minPrice", "100000"), ("state", "CA")]);
///
/// let key_a = KeyDeriver::derive(CacheCategory::SearchResults, KeySource::Filters(&a)).unwrap();
/// let key_b = KeyDeriver::derive(CacheCategory::SearchResults, KeySource::Filters(&b)).unwrap();
/// assert_eq!(key_a, key_b);
/// assert!(key_a.as_str().starts_with("properties:search:"));
/// ```
pub struct KeyDeriver;

impl KeyDeriver {
    /// Derives the key for `category` from `source`.
    ///
    /// Fails with [`CacheError::KeyShape`] when the source does not fit the
    /// category (a filter set for a property detail, an empty identifier).
    pub fn derive(category: CacheCategory, source: KeySource<'_>) -> Result<CacheKey, CacheError> {
        let key = match (category.shape(), source) {
            (KeyShape::Singleton, KeySource::Singleton) => category.prefix().to_string(),
            (KeyShape::Identifier, KeySource::Identifier(id)) if !id.trim().is_empty() => {
                format!("{}:{}", category.prefix(), Self::identifier_segment(id.trim()))
            },
            (KeyShape::Filters, KeySource::Filters(filters)) => {
                format!("{}:{}", category.prefix(), Self::digest(&filters.canonical_string()))
            },
            (_, KeySource::Identifier(_)) if category.shape() == KeyShape::Identifier => {
                return Err(CacheError::KeyShape {
                    category,
                    given: "an empty identifier",
                });
            },
            (_, other) => {
                return Err(CacheError::KeyShape {
                    category,
                    given: other.describe(),
                });
            },
        };

        Ok(CacheKey { category, key })
    }

    pub fn filter_options() -> CacheKey {
        Self::singleton(CacheCategory::FilterOptions)
    }

    pub fn all_properties() -> CacheKey {
        Self::singleton(CacheCategory::AllProperties)
    }

    pub fn property_detail(id: &PropertyId) -> CacheKey {
        Self::identified(CacheCategory::PropertyDetail, id.as_str())
    }

    pub fn user_properties(owner: &UserId) -> CacheKey {
        Self::identified(CacheCategory::UserProperties, owner.as_str())
    }

    pub fn search(filters: &FilterSet) -> CacheKey {
        CacheKey {
            category: CacheCategory::SearchResults,
            key: format!(
                "{}:{}",
                CacheCategory::SearchResults.prefix(),
                Self::digest(&filters.canonical_string())
            ),
        }
    }

    fn singleton(category: CacheCategory) -> CacheKey {
        CacheKey {
            category,
            key: category.prefix().to_string(),
        }
    }

    fn identified(category: CacheCategory, id: &str) -> CacheKey {
        CacheKey {
            category,
            key: format!("{}:{}", category.prefix(), Self::identifier_segment(id.trim())),
        }
    }

    /// Key segment for an identifier: the identifier itself when it is
    /// short and glob-safe, its digest otherwise.
    pub fn identifier_segment(id: &str) -> Cow<'_, str> {
        let safe = !id.is_empty()
            && id.len() <= MAX_LITERAL_ID_LEN
            && !id
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, ':' | '*' | '?' | '[' | ']' | '{' | '}' | '\\'));

        if safe {
            Cow::Borrowed(id)
        } else {
            Cow::Owned(Self::digest(id))
        }
    }

    /// 128-bit hex digest of `text`.
    pub fn digest(text: &str) -> String {
        let hash = Sha256::digest(text.as_bytes());
        hex::encode(&hash[..DIGEST_BYTES])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::{FilterField, FilterValue};

    #[test]
    fn test_search_key_ignores_insertion_order() {
        let a = FilterSet::from_params([("state", "CA"), ("minPrice", "100000")]);
        let b = FilterSet::from_params([("minPrice", "100000"), ("state", "CA")]);

        assert_eq!(KeyDeriver::search(&a), KeyDeriver::search(&b));
    }

    #[test]
    fn test_negative_zero_price_shares_key() {
        let a = FilterSet::from_params([("minPrice", "0")]);
        let b = FilterSet::from_params([("minPrice", "-0")]);

        assert_eq!(a, b);
        assert_eq!(KeyDeriver::search(&a), KeyDeriver::search(&b));
    }

    #[test]
    fn test_single_tag_key_independent_of_construction() {
        let parsed = FilterSet::from_params([("tags", "pool")]);
        let built = FilterSet::new().with(FilterField::Tags, FilterValue::scalar("pool"));

        assert_eq!(parsed, built);
        assert_eq!(KeyDeriver::search(&parsed), KeyDeriver::search(&built));
    }

    #[test]
    fn test_search_key_format() {
        let key = KeyDeriver::search(&FilterSet::new());
        let digest = key.as_str().strip_prefix("properties:search:").unwrap();

        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.category(), CacheCategory::SearchResults);
    }

    #[test]
    fn test_different_filters_different_keys() {
        let samples = [
            FilterSet::new(),
            FilterSet::from_params([("state", "CA")]),
            FilterSet::from_params([("state", "NY")]),
            FilterSet::from_params([("state", "CA"), ("minPrice", "100000")]),
            FilterSet::from_params([("state", "CA"), ("maxPrice", "100000")]),
            FilterSet::from_params([("state", "CA"), ("page", "2")]),
            FilterSet::from_params([("state", "CA"), ("sortOrder", "asc")]),
            FilterSet::from_params([("bedrooms", "3")]),
            FilterSet::from_params([("bedrooms", "3,4")]),
            FilterSet::new().with(FilterField::IsAvailable, FilterValue::flag(true)),
            FilterSet::new().with(FilterField::IsAvailable, FilterValue::flag(false)),
        ];

        let keys: std::collections::HashSet<_> = samples.iter().map(KeyDeriver::search).collect();
        assert_eq!(keys.len(), samples.len());
    }

    #[test]
    fn test_literal_keys() {
        assert_eq!(KeyDeriver::all_properties().as_str(), "properties:all");
        assert_eq!(KeyDeriver::filter_options().as_str(), "properties:filter-options");
        assert_eq!(
            KeyDeriver::property_detail(&PropertyId::new("PROP0001")).as_str(),
            "property:detail:PROP0001"
        );
        assert_eq!(
            KeyDeriver::user_properties(&UserId::new("u-17")).as_str(),
            "properties:user:u-17"
        );
    }

    #[test]
    fn test_unsafe_identifiers_are_hashed() {
        let key = KeyDeriver::property_detail(&PropertyId::new("weird*id"));
        assert!(!key.as_str().contains('*'));
        assert_eq!(key.as_str().len(), "property:detail:".len() + 32);

        let long = "x".repeat(100);
        let key = KeyDeriver::user_properties(&UserId::new(long));
        assert_eq!(key.as_str().len(), "properties:user:".len() + 32);
    }

    #[test]
    fn test_derive_matches_helpers() {
        let filters = FilterSet::from_params([("city", "Austin")]);
        let id = PropertyId::new("PROP0042");

        assert_eq!(
            KeyDeriver::derive(CacheCategory::SearchResults, KeySource::Filters(&filters)).unwrap(),
            KeyDeriver::search(&filters)
        );
        assert_eq!(
            KeyDeriver::derive(CacheCategory::PropertyDetail, KeySource::Identifier(id.as_str()))
                .unwrap(),
            KeyDeriver::property_detail(&id)
        );
        assert_eq!(
            KeyDeriver::derive(CacheCategory::AllProperties, KeySource::Singleton).unwrap(),
            KeyDeriver::all_properties()
        );
    }

    #[test]
    fn test_derive_rejects_wrong_shape() {
        let filters = FilterSet::new();

        let err = KeyDeriver::derive(CacheCategory::PropertyDetail, KeySource::Filters(&filters))
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::KeyShape {
                category: CacheCategory::PropertyDetail,
                given: "a filter set"
            }
        );

        let err = KeyDeriver::derive(CacheCategory::UserProperties, KeySource::Identifier("  "))
            .unwrap_err();
        assert!(matches!(err, CacheError::KeyShape { given: "an empty identifier", .. }));

        assert!(KeyDeriver::derive(CacheCategory::SearchResults, KeySource::Singleton).is_err());
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(KeyDeriver::digest("abc"), KeyDeriver::digest("abc"));
        assert_ne!(KeyDeriver::digest("abc"), KeyDeriver::digest("abd"));
    }
}
