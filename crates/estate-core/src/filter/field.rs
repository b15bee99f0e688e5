//! The schema of recognized filter and sort fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the values of a filter field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Single free-text value; repeated keys keep the last one.
    Text,
    /// Text matched by equality; one value or a set of alternatives.
    TextChoice,
    /// Numeric value matched by equality; one value or a set of alternatives.
    NumericChoice,
    /// Numeric lower/upper bound pair fed by `min*`/`max*` query keys.
    NumericRange,
    /// `true` / `false`.
    Flag,
    /// Always a set; matches when any member is present on the record.
    TagSet,
}

/// A filter field recognized by the search endpoint.
///
/// Query keys outside this schema are ignored, so they never influence
/// cache identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    Search,
    #[serde(rename = "type")]
    PropertyType,
    ListingType,
    Furnished,
    ListedBy,
    State,
    City,
    Location,
    Price,
    #[serde(rename = "areaSqFt")]
    AreaSqFt,
    Bedrooms,
    Bathrooms,
    Rating,
    IsVerified,
    IsAvailable,
    AvailableFrom,
    CreatedAt,
    Amenities,
    Tags,
}

/// Which end of a range a query key sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl FilterField {
    /// All recognized fields.
    pub const ALL: [FilterField; 19] = [
        FilterField::Search,
        FilterField::PropertyType,
        FilterField::ListingType,
        FilterField::Furnished,
        FilterField::ListedBy,
        FilterField::State,
        FilterField::City,
        FilterField::Location,
        FilterField::Price,
        FilterField::AreaSqFt,
        FilterField::Bedrooms,
        FilterField::Bathrooms,
        FilterField::Rating,
        FilterField::IsVerified,
        FilterField::IsAvailable,
        FilterField::AvailableFrom,
        FilterField::CreatedAt,
        FilterField::Amenities,
        FilterField::Tags,
    ];

    /// Canonical field name, used in the serialized form of a filter set.
    pub fn name(&self) -> &'static str {
        match self {
            FilterField::Search => "search",
            FilterField::PropertyType => "type",
            FilterField::ListingType => "listingType",
            FilterField::Furnished => "furnished",
            FilterField::ListedBy => "listedBy",
            FilterField::State => "state",
            FilterField::City => "city",
            FilterField::Location => "location",
            FilterField::Price => "price",
            FilterField::AreaSqFt => "areaSqFt",
            FilterField::Bedrooms => "bedrooms",
            FilterField::Bathrooms => "bathrooms",
            FilterField::Rating => "rating",
            FilterField::IsVerified => "isVerified",
            FilterField::IsAvailable => "isAvailable",
            FilterField::AvailableFrom => "availableFrom",
            FilterField::CreatedAt => "createdAt",
            FilterField::Amenities => "amenities",
            FilterField::Tags => "tags",
        }
    }

    /// Value interpretation for this field.
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterField::Search | FilterField::Location | FilterField::AvailableFrom => {
                FilterKind::Text
            },
            FilterField::PropertyType
            | FilterField::ListingType
            | FilterField::Furnished
            | FilterField::ListedBy
            | FilterField::State
            | FilterField::City => FilterKind::TextChoice,
            FilterField::Bedrooms | FilterField::Bathrooms => FilterKind::NumericChoice,
            FilterField::Price
            | FilterField::AreaSqFt
            | FilterField::Rating
            | FilterField::CreatedAt => FilterKind::NumericRange,
            FilterField::IsVerified | FilterField::IsAvailable => FilterKind::Flag,
            FilterField::Amenities | FilterField::Tags => FilterKind::TagSet,
        }
    }

    /// Resolves a request query key to the field it feeds.
    ///
    /// Range fields are fed by a pair of keys (`minPrice` / `maxPrice`), so
    /// the bound is returned alongside the field.
    pub fn from_query_key(key: &str) -> Option<(FilterField, Option<Bound>)> {
        let resolved = match key {
            "search" => (FilterField::Search, None),
            "type" => (FilterField::PropertyType, None),
            "listingType" => (FilterField::ListingType, None),
            "furnished" => (FilterField::Furnished, None),
            "listedBy" => (FilterField::ListedBy, None),
            "state" => (FilterField::State, None),
            "city" => (FilterField::City, None),
            "location" => (FilterField::Location, None),
            "minPrice" => (FilterField::Price, Some(Bound::Min)),
            "maxPrice" => (FilterField::Price, Some(Bound::Max)),
            "minArea" => (FilterField::AreaSqFt, Some(Bound::Min)),
            "maxArea" => (FilterField::AreaSqFt, Some(Bound::Max)),
            "minRating" => (FilterField::Rating, Some(Bound::Min)),
            "maxRating" => (FilterField::Rating, Some(Bound::Max)),
            "createdAfter" => (FilterField::CreatedAt, Some(Bound::Min)),
            "createdBefore" => (FilterField::CreatedAt, Some(Bound::Max)),
            "bedrooms" => (FilterField::Bedrooms, None),
            "bathrooms" => (FilterField::Bathrooms, None),
            "isVerified" => (FilterField::IsVerified, None),
            "isAvailable" => (FilterField::IsAvailable, None),
            "availableFrom" => (FilterField::AvailableFrom, None),
            "amenities" => (FilterField::Amenities, None),
            "tags" => (FilterField::Tags, None),
            _ => return None,
        };
        Some(resolved)
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields a search can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Price,
    #[serde(rename = "areaSqFt")]
    AreaSqFt,
    Bedrooms,
    Bathrooms,
    Rating,
    Title,
}

impl SortField {
    pub fn name(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Price => "price",
            SortField::AreaSqFt => "areaSqFt",
            SortField::Bedrooms => "bedrooms",
            SortField::Bathrooms => "bathrooms",
            SortField::Rating => "rating",
            SortField::Title => "title",
        }
    }

    /// Parses a `sortBy` value; unknown names fall back to the default.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim() {
            "price" => SortField::Price,
            "areaSqFt" => SortField::AreaSqFt,
            "bedrooms" => SortField::Bedrooms,
            "bathrooms" => SortField::Bathrooms,
            "rating" => SortField::Rating,
            "title" => SortField::Title,
            _ => SortField::CreatedAt,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn name(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Anything other than `asc` sorts descending.
    pub fn parse_or_default(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_name_round_trips_through_query_keys() {
        for field in FilterField::ALL {
            if field.kind() == FilterKind::NumericRange {
                continue;
            }
            let (resolved, bound) = FilterField::from_query_key(field.name()).unwrap();
            assert_eq!(resolved, field);
            assert!(bound.is_none());
        }
    }

    #[test]
    fn range_keys_carry_bounds() {
        assert_eq!(
            FilterField::from_query_key("minPrice"),
            Some((FilterField::Price, Some(Bound::Min)))
        );
        assert_eq!(
            FilterField::from_query_key("createdBefore"),
            Some((FilterField::CreatedAt, Some(Bound::Max)))
        );
    }

    #[test]
    fn unknown_keys_are_not_recognized() {
        assert!(FilterField::from_query_key("price").is_none());
        assert!(FilterField::from_query_key("$where").is_none());
    }

    #[test]
    fn sort_parsing_falls_back() {
        assert_eq!(SortField::parse_or_default("price"), SortField::Price);
        assert_eq!(SortField::parse_or_default("password"), SortField::CreatedAt);
        assert_eq!(SortOrder::parse_or_default("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse_or_default("sideways"), SortOrder::Desc);
    }
}
