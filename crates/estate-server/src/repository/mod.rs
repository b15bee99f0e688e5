//! Data source behind the cache.

use async_trait::async_trait;
use estate_core::{
    EstateError, FilterOptions, FilterSet, PropertyDraft, PropertyId, PropertyPatch,
    PropertyRecord, UserId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod memory;

pub use memory::InMemoryRepository;

/// Errors returned by a [`PropertyRepository`].
///
/// Unlike cache errors these always reach the client.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("property '{0}' not found")]
    NotFound(PropertyId),

    #[error("user '{user}' is not allowed to modify property '{id}'")]
    Forbidden { id: PropertyId, user: UserId },

    #[error("property '{0}' already exists")]
    Conflict(PropertyId),

    #[error(transparent)]
    Invalid(#[from] EstateError),

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Pagination block of a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: usize,
    pub results_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    pub fn new(page: u32, limit: u32, total: usize) -> Self {
        let total_pages = total.div_ceil(limit.max(1) as usize) as u32;
        Self {
            current_page: page,
            total_pages,
            total_results: total,
            results_per_page: limit,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub data: Vec<PropertyRecord>,
    pub pagination: PageInfo,
}

/// A draft of a bulk import that was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Position of the draft in the submitted array.
    pub index: usize,
    pub error: String,
}

/// Outcome of a bulk import. Drafts are inserted independently; one bad
/// draft does not reject the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total_records: usize,
    pub successful_inserts: usize,
    pub failed_inserts: usize,
    pub errors: Vec<ImportFailure>,
    pub inserted_properties: Vec<PropertyRecord>,
}

/// Storage for property listings.
///
/// Writes that target an existing record check ownership: only the owner
/// may update or delete it.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create(&self, owner: &UserId, draft: PropertyDraft) -> Result<PropertyRecord, RepositoryError>;

    async fn bulk_create(
        &self,
        owner: &UserId,
        drafts: Vec<PropertyDraft>,
    ) -> Result<ImportReport, RepositoryError>;

    async fn update(
        &self,
        actor: &UserId,
        id: &PropertyId,
        patch: PropertyPatch,
    ) -> Result<PropertyRecord, RepositoryError>;

    /// Removes the record and returns it.
    async fn delete(&self, actor: &UserId, id: &PropertyId) -> Result<PropertyRecord, RepositoryError>;

    async fn get(&self, id: &PropertyId) -> Result<PropertyRecord, RepositoryError>;

    /// Every listing, newest first.
    async fn list(&self) -> Result<Vec<PropertyRecord>, RepositoryError>;

    /// Listings owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<PropertyRecord>, RepositoryError>;

    async fn search(&self, filters: &FilterSet) -> Result<SearchPage, RepositoryError>;

    async fn filter_options(&self) -> Result<FilterOptions, RepositoryError>;

    /// Name used in logs and health output.
    fn name(&self) -> &str;
}
