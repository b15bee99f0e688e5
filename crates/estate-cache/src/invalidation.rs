//! Which cache keys a write makes stale.

use std::fmt;

use estate_core::{PropertyId, UserId};

use crate::category::CacheCategory;
use crate::keys::KeyDeriver;

/// Kind of write performed against the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKind {
    Create,
    Update,
    Delete,
    /// Several records created in one request.
    BulkImport,
}

impl WriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteKind::Create => "create",
            WriteKind::Update => "update",
            WriteKind::Delete => "delete",
            WriteKind::BulkImport => "bulk_import",
        }
    }
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write, annotated with whatever is known about the affected record.
///
/// Identifiers known before the write (the id in an update URL) are set up
/// front; identifiers only known after it commits (the id assigned by a
/// create) are filled in with [`complete_with`](Self::complete_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOperation {
    kind: WriteKind,
    property_id: Option<PropertyId>,
    owner_id: Option<UserId>,
}

impl WriteOperation {
    pub fn new(kind: WriteKind) -> Self {
        Self {
            kind,
            property_id: None,
            owner_id: None,
        }
    }

    pub fn create() -> Self {
        Self::new(WriteKind::Create)
    }

    pub fn update(id: PropertyId) -> Self {
        Self::new(WriteKind::Update).with_property(id)
    }

    pub fn delete(id: PropertyId) -> Self {
        Self::new(WriteKind::Delete).with_property(id)
    }

    pub fn bulk_import() -> Self {
        Self::new(WriteKind::BulkImport)
    }

    pub fn with_property(mut self, id: PropertyId) -> Self {
        self.property_id = Some(id);
        self
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner_id = Some(owner);
        self
    }

    /// Fills identifiers that were unknown before the write. Identifiers
    /// already set are kept.
    pub fn complete_with(mut self, property_id: Option<PropertyId>, owner_id: Option<UserId>) -> Self {
        if self.property_id.is_none() {
            self.property_id = property_id;
        }
        if self.owner_id.is_none() {
            self.owner_id = owner_id;
        }
        self
    }

    pub fn kind(&self) -> WriteKind {
        self.kind
    }

    pub fn property_id(&self) -> Option<&PropertyId> {
        self.property_id.as_ref()
    }

    pub fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }
}

/// Resultado de una invalidacion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationResult {
    /// Keys removed across all patterns.
    pub count: usize,
    /// Patterns applied, in order.
    pub patterns: Vec<String>,
}

/// Maps writes to the key patterns they invalidate.
///
/// Every write purges the full listing, every search page (any filter
/// combination may now be stale), the facet summary, the detail entry of
/// the record when its id is known and the owner's listing when the owner
/// is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidationPolicy;

impl InvalidationPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Glob patterns to purge after `operation` commits.
    pub fn keys_to_invalidate(&self, operation: &WriteOperation) -> Vec<String> {
        let mut patterns = vec![
            CacheCategory::AllProperties.pattern(),
            CacheCategory::SearchResults.pattern(),
        ];

        if let Some(id) = operation.property_id() {
            patterns.push(KeyDeriver::property_detail(id).as_str().to_string());
        }
        if let Some(owner) = operation.owner_id() {
            patterns.push(KeyDeriver::user_properties(owner).as_str().to_string());
        }

        // TODO: only purge when the write adds a facet value not seen before.
        patterns.push(CacheCategory::FilterOptions.pattern());
        patterns
    }

    /// Patterns covering every key of every listing category.
    pub fn all_property_patterns(&self) -> [&'static str; 2] {
        ["properties:*", "property:*"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_invalidates_detail_and_listings() {
        let op = WriteOperation::update(PropertyId::new("PROP0001"));
        let patterns = InvalidationPolicy.keys_to_invalidate(&op);

        assert_eq!(
            patterns,
            vec![
                "properties:all",
                "properties:search:*",
                "property:detail:PROP0001",
                "properties:filter-options",
            ]
        );
    }

    #[test]
    fn test_create_with_owner_invalidates_user_listing() {
        let op = WriteOperation::create()
            .complete_with(Some(PropertyId::new("PROP0009")), Some(UserId::new("u-1")));
        let patterns = InvalidationPolicy.keys_to_invalidate(&op);

        assert!(patterns.contains(&"properties:user:u-1".to_string()));
        assert!(patterns.contains(&"property:detail:PROP0009".to_string()));
    }

    #[test]
    fn test_bulk_import_without_ids() {
        let patterns = InvalidationPolicy.keys_to_invalidate(&WriteOperation::bulk_import());
        assert_eq!(patterns.len(), 3);
        assert!(patterns.iter().all(|p| !p.starts_with("property:detail")));
    }

    #[test]
    fn test_complete_with_keeps_known_ids() {
        let op = WriteOperation::delete(PropertyId::new("A"))
            .complete_with(Some(PropertyId::new("B")), Some(UserId::new("u")));

        assert_eq!(op.property_id(), Some(&PropertyId::new("A")));
        assert_eq!(op.owner_id(), Some(&UserId::new("u")));
        assert_eq!(op.kind(), WriteKind::Delete);
    }

    #[test]
    fn test_user_key_for_unsafe_owner_is_hashed() {
        let op = WriteOperation::create().with_owner(UserId::new("a*b"));
        let patterns = InvalidationPolicy.keys_to_invalidate(&op);

        let user = patterns
            .iter()
            .find(|p| p.starts_with("properties:user:"))
            .unwrap();
        assert!(!user.contains('*'));
    }
}
