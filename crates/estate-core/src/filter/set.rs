use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::field::{Bound, FilterField, FilterKind, SortField, SortOrder};
use super::value::{FilterValue, Scalar, number};

/// Page number and page size of a listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Creates a pagination, clamping `page` to at least 1 and `limit`
    /// to `1..=MAX_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip for this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// The normalized parameter bundle describing a search request.
///
/// Identity ignores the order in which filters were added: two sets
/// holding the same field/value pairs compare equal and produce the same
/// [`canonical_string`](FilterSet::canonical_string).
///
/// # Example
///
/// ```
/// use estate_core::FilterSet;
///
/// let a = FilterSet::from_params([("state", "CA"), ("minPrice", "100000")]);
/// let b = FilterSet::from_params([("minPrice", "100000"), ("state", "CA")]);
/// assert_eq!(a, b);
/// assert_eq!(a.canonical_string(), b.canonical_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    filters: BTreeMap<FilterField, FilterValue>,
    sort_by: SortField,
    sort_order: SortOrder,
    pagination: Pagination,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter set from raw query parameters, discarding keys that
    /// are not part of the filter schema.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::parse_params(params).0
    }

    /// Builds a filter set from raw query parameters and also returns the
    /// keys that were ignored.
    ///
    /// Values that cannot be interpreted for their field (a non-numeric
    /// price, a flag other than `true`/`false`) are dropped as well.
    pub fn parse_params<I, K, V>(params: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = FilterSet::new();
        let mut ignored = Vec::new();
        let mut choices: BTreeMap<FilterField, Vec<Scalar>> = BTreeMap::new();
        let mut page = 1;
        let mut limit = Pagination::DEFAULT_LIMIT;

        for (key, raw) in params {
            let key = key.as_ref();
            let raw = raw.as_ref().trim();

            match key {
                "sortBy" => {
                    set.sort_by = SortField::parse_or_default(raw);
                    continue;
                },
                "sortOrder" => {
                    set.sort_order = SortOrder::parse_or_default(raw);
                    continue;
                },
                "page" => {
                    page = raw.parse().unwrap_or(1);
                    continue;
                },
                "limit" => {
                    limit = raw.parse().unwrap_or(Pagination::DEFAULT_LIMIT);
                    continue;
                },
                _ => {},
            }

            let Some((field, bound)) = FilterField::from_query_key(key) else {
                ignored.push(key.to_string());
                continue;
            };

            if raw.is_empty() {
                continue;
            }

            match field.kind() {
                FilterKind::Text => {
                    set.filters.insert(field, FilterValue::scalar(raw));
                },
                FilterKind::TextChoice | FilterKind::TagSet => {
                    choices
                        .entry(field)
                        .or_default()
                        .extend(split_values(raw).map(Scalar::from));
                },
                FilterKind::NumericChoice => {
                    choices
                        .entry(field)
                        .or_default()
                        .extend(split_values(raw).filter_map(parse_number).map(Scalar::from));
                },
                FilterKind::NumericRange => {
                    let Some(number) = parse_number(raw) else {
                        continue;
                    };
                    let (min, max) = match set.filters.get(&field) {
                        Some(FilterValue::Range { min, max }) => {
                            (min.map(|v| v.into_inner()), max.map(|v| v.into_inner()))
                        },
                        _ => (None, None),
                    };
                    let value = match bound {
                        Some(Bound::Max) => FilterValue::range(min, Some(number)),
                        _ => FilterValue::range(Some(number), max),
                    };
                    set.filters.insert(field, value);
                },
                FilterKind::Flag => match raw.to_ascii_lowercase().as_str() {
                    "true" => {
                        set.filters.insert(field, FilterValue::flag(true));
                    },
                    "false" => {
                        set.filters.insert(field, FilterValue::flag(false));
                    },
                    _ => {},
                },
            }
        }

        for (field, values) in choices {
            set.insert_choices(field, values);
        }
        set.pagination = Pagination::new(page, limit);

        (set, ignored)
    }

    /// Binds a value to a field, replacing any previous one. Empty values
    /// remove the field instead.
    pub fn with(mut self, field: FilterField, value: FilterValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: FilterField, value: FilterValue) {
        let value = match value {
            FilterValue::List { values } => return self.insert_choices(field, values),
            FilterValue::Scalar { value } if field.kind() == FilterKind::TagSet => {
                return self.insert_choices(field, vec![value]);
            },
            other => other,
        };
        if value.is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, value);
        }
    }

    pub fn with_sort(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Multi-valued fields collapse a single distinct alternative into a
    /// scalar, so `type=house` and `type=house,house` are the same filter.
    fn insert_choices(&mut self, field: FilterField, values: Vec<Scalar>) {
        let list = FilterValue::list(values);
        let value = match list {
            FilterValue::List { mut values }
                if values.len() == 1 && field.kind() != FilterKind::TagSet =>
            {
                FilterValue::Scalar {
                    value: values.remove(0),
                }
            },
            other => other,
        };
        if value.is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, value);
        }
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.filters.get(&field)
    }

    /// Iterates over the bound filters.
    pub fn filters(&self) -> impl Iterator<Item = (FilterField, &FilterValue)> {
        self.filters.iter().map(|(field, value)| (*field, value))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn sort_by(&self) -> SortField {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Canonical JSON text of the set: keys sorted lexicographically at
    /// every level, defaults materialized.
    pub fn canonical_string(&self) -> String {
        let mut by_name: BTreeMap<&'static str, Value> = BTreeMap::new();
        for (field, value) in &self.filters {
            by_name.insert(field.name(), value.canonical());
        }
        let mut filters = Map::new();
        for (name, value) in by_name {
            filters.insert(name.to_string(), value);
        }

        let mut root = Map::new();
        root.insert("filters".to_string(), Value::Object(filters));
        root.insert("limit".to_string(), Value::from(self.pagination.limit));
        root.insert("page".to_string(), Value::from(self.pagination.page));
        root.insert("sortBy".to_string(), Value::from(self.sort_by.name()));
        root.insert("sortOrder".to_string(), Value::from(self.sort_order.name()));

        Value::Object(root).to_string()
    }
}

fn split_values(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| number(n).into_inner())
}
