//! Property listing records and their write payloads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{EstateError, Result};
use crate::types::{PropertyId, UserId};

/// A stored property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub owner_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub listing_type: String,
    #[serde(default)]
    pub furnished: String,
    #[serde(default)]
    pub listed_by: String,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub location: String,
    pub price: f64,
    #[serde(rename = "areaSqFt")]
    pub area_sq_ft: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time, unix seconds.
    pub created_at: u64,
    /// Last modification time, unix seconds.
    pub updated_at: u64,
}

fn default_true() -> bool {
    true
}

/// Payload for creating a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    /// Caller-supplied id (bulk imports carry their own); generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PropertyId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub listing_type: String,
    #[serde(default)]
    pub furnished: String,
    #[serde(default)]
    pub listed_by: String,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub location: String,
    pub price: f64,
    #[serde(rename = "areaSqFt")]
    pub area_sq_ft: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PropertyDraft {
    /// Checks the invariants every stored listing must satisfy.
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("type", &self.property_type)?;
        require_text("listingType", &self.listing_type)?;
        require_text("state", &self.state)?;
        require_text("city", &self.city)?;
        require_non_negative("price", self.price)?;
        require_non_negative("areaSqFt", self.area_sq_ft)?;
        require_rating(self.rating)?;
        Ok(())
    }

    /// Turns the draft into a record owned by `owner`.
    pub fn into_record(self, id: PropertyId, owner: UserId, now: u64) -> PropertyRecord {
        PropertyRecord {
            id,
            owner_id: owner,
            title: self.title,
            description: self.description,
            property_type: self.property_type,
            listing_type: self.listing_type,
            furnished: self.furnished,
            listed_by: self.listed_by,
            state: self.state,
            city: self.city,
            location: self.location,
            price: self.price,
            area_sq_ft: self.area_sq_ft,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            rating: self.rating,
            is_verified: self.is_verified,
            is_available: self.is_available,
            available_from: self.available_from,
            amenities: self.amenities,
            tags: self.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a listing. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub furnished: Option<String>,
    pub listed_by: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "areaSqFt")]
    pub area_sq_ft: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub rating: Option<f64>,
    pub is_verified: Option<bool>,
    pub is_available: Option<bool>,
    pub available_from: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl PropertyPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(price) = self.price {
            require_non_negative("price", price)?;
        }
        if let Some(area) = self.area_sq_ft {
            require_non_negative("areaSqFt", area)?;
        }
        if let Some(rating) = self.rating {
            require_rating(rating)?;
        }
        Ok(())
    }

    /// Applies the patch to `record`, stamping `updated_at`.
    pub fn apply(self, record: &mut PropertyRecord, now: u64) {
        if let Some(value) = self.title {
            record.title = value;
        }
        if let Some(value) = self.description {
            record.description = value;
        }
        if let Some(value) = self.property_type {
            record.property_type = value;
        }
        if let Some(value) = self.listing_type {
            record.listing_type = value;
        }
        if let Some(value) = self.furnished {
            record.furnished = value;
        }
        if let Some(value) = self.listed_by {
            record.listed_by = value;
        }
        if let Some(value) = self.state {
            record.state = value;
        }
        if let Some(value) = self.city {
            record.city = value;
        }
        if let Some(value) = self.location {
            record.location = value;
        }
        if let Some(value) = self.price {
            record.price = value;
        }
        if let Some(value) = self.area_sq_ft {
            record.area_sq_ft = value;
        }
        if let Some(value) = self.bedrooms {
            record.bedrooms = value;
        }
        if let Some(value) = self.bathrooms {
            record.bathrooms = value;
        }
        if let Some(value) = self.rating {
            record.rating = value;
        }
        if let Some(value) = self.is_verified {
            record.is_verified = value;
        }
        if let Some(value) = self.is_available {
            record.is_available = value;
        }
        if let Some(value) = self.amenities {
            record.amenities = value;
        }
        if let Some(value) = self.tags {
            record.tags = value;
        }
        if let Some(available_from) = self.available_from {
            record.available_from = Some(available_from);
        }
        record.updated_at = now;
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EstateError::validation_error(field, "must not be empty"));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EstateError::validation_error(field, "must be a non-negative number"));
    }
    Ok(())
}

fn require_rating(value: f64) -> Result<()> {
    if !(0.0..=5.0).contains(&value) {
        return Err(EstateError::validation_error("rating", "must be between 0 and 5"));
    }
    Ok(())
}

/// Inclusive min/max of a numeric attribute across all listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

/// Distinct facet values used to populate search dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub types: Vec<String>,
    pub listing_types: Vec<String>,
    pub furnished_options: Vec<String>,
    pub listed_by_options: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub amenities: Vec<String>,
    pub tags: Vec<String>,
    pub price_range: NumericRange,
    pub area_range: NumericRange,
    pub bedroom_options: Vec<u32>,
    pub bathroom_options: Vec<u32>,
}

impl FilterOptions {
    /// Summarizes the facets of `records`. Empty strings are skipped and
    /// every list comes out sorted.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PropertyRecord>,
    {
        let mut types = BTreeSet::new();
        let mut listing_types = BTreeSet::new();
        let mut furnished = BTreeSet::new();
        let mut listed_by = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut cities = BTreeSet::new();
        let mut amenities = BTreeSet::new();
        let mut tags = BTreeSet::new();
        let mut bedrooms = BTreeSet::new();
        let mut bathrooms = BTreeSet::new();
        let mut price: Option<NumericRange> = None;
        let mut area: Option<NumericRange> = None;

        fn push(set: &mut BTreeSet<String>, value: &str) {
            if !value.is_empty() {
                set.insert(value.to_string());
            }
        }

        fn widen(range: &mut Option<NumericRange>, value: f64) {
            let current = range.get_or_insert(NumericRange {
                min: value,
                max: value,
            });
            current.min = current.min.min(value);
            current.max = current.max.max(value);
        }

        for record in records {
            push(&mut types, &record.property_type);
            push(&mut listing_types, &record.listing_type);
            push(&mut furnished, &record.furnished);
            push(&mut listed_by, &record.listed_by);
            push(&mut states, &record.state);
            push(&mut cities, &record.city);
            for amenity in &record.amenities {
                push(&mut amenities, amenity);
            }
            for tag in &record.tags {
                push(&mut tags, tag);
            }
            bedrooms.insert(record.bedrooms);
            bathrooms.insert(record.bathrooms);
            widen(&mut price, record.price);
            widen(&mut area, record.area_sq_ft);
        }

        Self {
            types: types.into_iter().collect(),
            listing_types: listing_types.into_iter().collect(),
            furnished_options: furnished.into_iter().collect(),
            listed_by_options: listed_by.into_iter().collect(),
            states: states.into_iter().collect(),
            cities: cities.into_iter().collect(),
            amenities: amenities.into_iter().collect(),
            tags: tags.into_iter().collect(),
            price_range: price.unwrap_or_default(),
            area_range: area.unwrap_or_default(),
            bedroom_options: bedrooms.into_iter().collect(),
            bathroom_options: bathrooms.into_iter().collect(),
        }
    }
}
