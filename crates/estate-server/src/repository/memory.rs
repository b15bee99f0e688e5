//! In-process property store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use estate_core::{
    FilterField, FilterOptions, FilterSet, FilterValue, PropertyDraft, PropertyId, PropertyPatch,
    PropertyRecord, Scalar, SortField, SortOrder, UserId,
};
use parking_lot::RwLock;
use tracing::debug;

use super::{ImportFailure, ImportReport, PageInfo, PropertyRepository, RepositoryError, SearchPage};

const ID_PREFIX: &str = "PROP";

#[derive(Default)]
struct Inner {
    records: HashMap<PropertyId, PropertyRecord>,
    /// Highest numeric suffix of any `PROPnnnn` id seen so far.
    last_number: u64,
}

impl Inner {
    fn next_id(&mut self) -> PropertyId {
        loop {
            self.last_number += 1;
            let id = PropertyId::new(format!("{ID_PREFIX}{:04}", self.last_number));
            if !self.records.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert(&mut self, record: PropertyRecord) {
        if let Some(number) = sequence_number(record.id.as_str()) {
            self.last_number = self.last_number.max(number);
        }
        self.records.insert(record.id.clone(), record);
    }

    fn create(&mut self, owner: &UserId, draft: PropertyDraft, now: u64) -> Result<PropertyRecord, RepositoryError> {
        draft.validate()?;

        let id = match draft.id.clone() {
            Some(id) if self.records.contains_key(&id) => return Err(RepositoryError::Conflict(id)),
            Some(id) => id,
            None => self.next_id(),
        };

        let record = draft.into_record(id, owner.clone(), now);
        self.insert(record.clone());
        Ok(record)
    }

    fn owned_mut(&mut self, actor: &UserId, id: &PropertyId) -> Result<&mut PropertyRecord, RepositoryError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;

        if &record.owner_id != actor {
            return Err(RepositoryError::Forbidden {
                id: id.clone(),
                user: actor.clone(),
            });
        }
        Ok(record)
    }
}

/// Parses the numeric suffix of generated ids (`PROP0042` -> 42).
fn sequence_number(id: &str) -> Option<u64> {
    let digits = id.strip_prefix(ID_PREFIX)?;
    if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Property repository kept in process memory.
///
/// Generated ids follow the `PROP0001` sequence, continuing after the
/// highest id already stored.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<Inner>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `records`.
    pub fn with_records(records: impl IntoIterator<Item = PropertyRecord>) -> Self {
        let repo = Self::new();
        {
            let mut inner = repo.inner.write();
            for record in records {
                inner.insert(record);
            }
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted(&self, filter: impl Fn(&PropertyRecord) -> bool) -> Vec<PropertyRecord> {
        let inner = self.inner.read();
        let mut records: Vec<PropertyRecord> =
            inner.records.values().filter(|r| filter(r)).cloned().collect();
        sort_records(&mut records, SortField::CreatedAt, SortOrder::Desc);
        records
    }
}

#[async_trait]
impl PropertyRepository for InMemoryRepository {
    async fn create(&self, owner: &UserId, draft: PropertyDraft) -> Result<PropertyRecord, RepositoryError> {
        let record = self.inner.write().create(owner, draft, unix_now())?;
        debug!(id = %record.id, owner = %owner, "Property created");
        Ok(record)
    }

    async fn bulk_create(
        &self,
        owner: &UserId,
        drafts: Vec<PropertyDraft>,
    ) -> Result<ImportReport, RepositoryError> {
        let now = unix_now();
        let mut report = ImportReport {
            total_records: drafts.len(),
            ..ImportReport::default()
        };

        let mut inner = self.inner.write();
        for (index, draft) in drafts.into_iter().enumerate() {
            match inner.create(owner, draft, now) {
                Ok(record) => report.inserted_properties.push(record),
                Err(e) => report.errors.push(ImportFailure {
                    index,
                    error: e.to_string(),
                }),
            }
        }
        report.successful_inserts = report.inserted_properties.len();
        report.failed_inserts = report.errors.len();

        Ok(report)
    }

    async fn update(
        &self,
        actor: &UserId,
        id: &PropertyId,
        patch: PropertyPatch,
    ) -> Result<PropertyRecord, RepositoryError> {
        let mut inner = self.inner.write();
        let record = inner.owned_mut(actor, id)?;
        patch.validate()?;
        patch.apply(record, unix_now());
        Ok(record.clone())
    }

    async fn delete(&self, actor: &UserId, id: &PropertyId) -> Result<PropertyRecord, RepositoryError> {
        let mut inner = self.inner.write();
        inner.owned_mut(actor, id)?;
        inner
            .records
            .remove(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    async fn get(&self, id: &PropertyId) -> Result<PropertyRecord, RepositoryError> {
        self.inner
            .read()
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    async fn list(&self) -> Result<Vec<PropertyRecord>, RepositoryError> {
        Ok(self.sorted(|_| true))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<PropertyRecord>, RepositoryError> {
        Ok(self.sorted(|r| &r.owner_id == owner))
    }

    async fn search(&self, filters: &FilterSet) -> Result<SearchPage, RepositoryError> {
        let mut matching: Vec<PropertyRecord> = {
            let inner = self.inner.read();
            inner
                .records
                .values()
                .filter(|record| matches_all(record, filters))
                .cloned()
                .collect()
        };
        sort_records(&mut matching, filters.sort_by(), filters.sort_order());

        let pagination = filters.pagination();
        let total = matching.len();
        let data = matching
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit() as usize)
            .collect();

        Ok(SearchPage {
            data,
            pagination: PageInfo::new(pagination.page(), pagination.limit(), total),
        })
    }

    async fn filter_options(&self) -> Result<FilterOptions, RepositoryError> {
        let inner = self.inner.read();
        Ok(FilterOptions::from_records(inner.records.values()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn sort_records(records: &mut [PropertyRecord], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let primary = match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::AreaSqFt => a.area_sq_ft.total_cmp(&b.area_sq_ft),
            SortField::Bedrooms => a.bedrooms.cmp(&b.bedrooms),
            SortField::Bathrooms => a.bathrooms.cmp(&b.bathrooms),
            SortField::Rating => a.rating.total_cmp(&b.rating),
            SortField::Title => a.title.cmp(&b.title),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        // Ties keep a stable, id-based order so pages never overlap.
        primary.then_with(|| a.id.cmp(&b.id))
    });
}

fn matches_all(record: &PropertyRecord, filters: &FilterSet) -> bool {
    filters
        .filters()
        .all(|(field, value)| matches_field(record, field, value))
}

fn matches_field(record: &PropertyRecord, field: FilterField, value: &FilterValue) -> bool {
    match field {
        FilterField::Search => text_operand(value).is_some_and(|needle| {
            [
                &record.title,
                &record.description,
                &record.location,
                &record.state,
                &record.city,
            ]
            .into_iter()
            .chain(record.tags.iter())
            .any(|haystack| contains_ignore_case(haystack, needle))
        }),
        FilterField::PropertyType => exact_or_any(&record.property_type, value),
        FilterField::ListingType => exact_or_any(&record.listing_type, value),
        FilterField::Furnished => exact_or_any(&record.furnished, value),
        FilterField::ListedBy => exact_or_any(&record.listed_by, value),
        FilterField::State => partial_or_any(&record.state, value),
        FilterField::City => partial_or_any(&record.city, value),
        FilterField::Location => {
            text_operand(value).is_some_and(|needle| contains_ignore_case(&record.location, needle))
        },
        FilterField::Price => in_range(record.price, value),
        FilterField::AreaSqFt => in_range(record.area_sq_ft, value),
        FilterField::Rating => in_range(record.rating, value),
        FilterField::CreatedAt => in_range(record.created_at as f64, value),
        FilterField::Bedrooms => number_or_any(f64::from(record.bedrooms), value),
        FilterField::Bathrooms => number_or_any(f64::from(record.bathrooms), value),
        FilterField::IsVerified => flag_is(record.is_verified, value),
        FilterField::IsAvailable => flag_is(record.is_available, value),
        FilterField::AvailableFrom => match (&record.available_from, text_operand(value)) {
            // ISO dates compare correctly as strings.
            (Some(available), Some(until)) => available.as_str() <= until,
            _ => false,
        },
        FilterField::Amenities => any_member(&record.amenities, value),
        FilterField::Tags => any_member(&record.tags, value),
    }
}

fn text_operand(value: &FilterValue) -> Option<&str> {
    match value {
        FilterValue::Scalar { value } => value.as_str(),
        _ => None,
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn list_contains_text(values: &[Scalar], actual: &str) -> bool {
    values.iter().any(|v| v.as_str() == Some(actual))
}

/// Scalars match exactly, lists match any member.
fn exact_or_any(actual: &str, value: &FilterValue) -> bool {
    match value {
        FilterValue::Scalar { value } => value.as_str() == Some(actual),
        FilterValue::List { values } => list_contains_text(values, actual),
        _ => false,
    }
}

/// Scalars match as a case-insensitive substring, lists match any member.
fn partial_or_any(actual: &str, value: &FilterValue) -> bool {
    match value {
        FilterValue::Scalar { value } => value
            .as_str()
            .is_some_and(|needle| contains_ignore_case(actual, needle)),
        FilterValue::List { values } => list_contains_text(values, actual),
        _ => false,
    }
}

fn number_or_any(actual: f64, value: &FilterValue) -> bool {
    match value {
        FilterValue::Scalar { value } => value.as_f64() == Some(actual),
        FilterValue::List { values } => values.iter().any(|v| v.as_f64() == Some(actual)),
        _ => false,
    }
}

fn in_range(actual: f64, value: &FilterValue) -> bool {
    match value {
        FilterValue::Range { min, max } => {
            min.is_none_or(|min| actual.total_cmp(&min.into_inner()) != Ordering::Less)
                && max.is_none_or(|max| actual.total_cmp(&max.into_inner()) != Ordering::Greater)
        },
        _ => false,
    }
}

fn flag_is(actual: bool, value: &FilterValue) -> bool {
    matches!(value, FilterValue::Flag { value } if *value == actual)
}

fn any_member(actual: &[String], value: &FilterValue) -> bool {
    match value {
        FilterValue::List { values } => actual.iter().any(|a| list_contains_text(values, a)),
        FilterValue::Scalar { value } => value.as_str().is_some_and(|v| actual.iter().any(|a| a == v)),
        _ => false,
    }
}
