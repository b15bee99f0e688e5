//! Cache error taxonomy.
//!
//! None of these errors ever fails a request: the store and the facade
//! recover from them locally and report them as warnings on a
//! [`CacheOutcome`](crate::CacheOutcome). Loader and mutation errors are
//! not part of this enum; they belong to the caller and propagate as-is.

use thiserror::Error;

use crate::category::CacheCategory;

/// Errors produced by the cache layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the command.
    #[error("cache backend '{backend}' unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// A backend call did not complete within the operation timeout.
    #[error("cache operation '{operation}' timed out after {millis}ms")]
    Timeout { operation: &'static str, millis: u64 },

    /// A value could not be encoded for storage or decoded after a read.
    #[error("cached value for '{key}' could not be encoded or decoded: {reason}")]
    Serialization { key: String, reason: String },

    /// A deletion pattern is not a valid glob.
    #[error("invalid key pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The key source does not match the category's key shape.
    #[error("category '{category}' cannot be keyed by {given}")]
    KeyShape {
        category: CacheCategory,
        given: &'static str,
    },

    /// A purge after a committed write did not complete.
    #[error("invalidation of '{pattern}' failed: {reason}")]
    Invalidation { pattern: String, reason: String },
}

impl CacheError {
    /// Creates a BackendUnavailable error.
    pub fn unavailable(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Serialization error.
    pub fn serialization(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialization {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidPattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the backend itself is unhealthy (as opposed to a bad
    /// value or a bad key), meaning further calls right now are pointless.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. } | Self::Timeout { .. })
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Serialization { .. } => "serialization",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::KeyShape { .. } => "key_shape",
            Self::Invalidation { .. } => "invalidation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::unavailable("redis", "connection refused");
        assert_eq!(
            err.to_string(),
            "cache backend 'redis' unavailable: connection refused"
        );

        let err = CacheError::Timeout {
            operation: "get",
            millis: 200,
        };
        assert_eq!(err.to_string(), "cache operation 'get' timed out after 200ms");

        let err = CacheError::KeyShape {
            category: CacheCategory::PropertyDetail,
            given: "a filter set",
        };
        assert!(err.to_string().contains("property:detail"));
    }

    #[test]
    fn test_is_transient() {
        assert!(CacheError::unavailable("redis", "down").is_transient());
        assert!(
            CacheError::Timeout {
                operation: "set",
                millis: 10
            }
            .is_transient()
        );
        assert!(!CacheError::serialization("k", "bad json").is_transient());
        assert!(!CacheError::invalid_pattern("[", "unclosed").is_transient());
    }
}
