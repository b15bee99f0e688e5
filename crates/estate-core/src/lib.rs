//! Estate Core - Domain types for the property listing service.
//!
//! This crate provides the foundational types shared by the cache layer
//! and the HTTP server:
//!
//! - [`PropertyId`] / [`UserId`]: identifier newtypes
//! - [`FilterSet`]: the normalized search parameter bundle
//! - [`PropertyRecord`]: the listing record and its write payloads
//! - [`EstateError`]: the domain error type

pub mod error;
pub mod filter;
pub mod property;
pub mod types;

pub use error::{EstateError, Result};
pub use filter::{
    FilterField, FilterKind, FilterSet, FilterValue, Pagination, Scalar, SortField, SortOrder,
};
pub use property::{FilterOptions, NumericRange, PropertyDraft, PropertyPatch, PropertyRecord};
pub use types::{PropertyId, UserId};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
