use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single filter operand.
///
/// Floats are wrapped in `OrderedFloat` so scalars can be sorted and
/// de-duplicated when a list is normalized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(OrderedFloat<f64>),
    Text(String),
}

impl Scalar {
    /// Returns the value as a str if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            Scalar::Number(_) => None,
        }
    }

    /// Returns the value as an f64 if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(n.into_inner()),
            Scalar::Text(_) => None,
        }
    }

    fn canonical(&self) -> Value {
        match self {
            Scalar::Number(n) => Value::from(number(n.into_inner()).into_inner()),
            Scalar::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Wraps a float, folding `-0.0` into `0.0` since `OrderedFloat` treats
/// them as equal but they print differently.
pub(crate) fn number(v: f64) -> OrderedFloat<f64> {
    OrderedFloat(if v == 0.0 { 0.0 } else { v })
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(number(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(OrderedFloat(v as f64))
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::Number(OrderedFloat(f64::from(v)))
    }
}

/// The value bound to a filter field: one of the recognized filter kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterValue {
    /// Equality against a single value.
    Scalar { value: Scalar },
    /// Membership in a set of alternatives. Kept sorted and de-duplicated.
    List { values: Vec<Scalar> },
    /// Inclusive numeric bounds; at least one side is present.
    Range {
        min: Option<OrderedFloat<f64>>,
        max: Option<OrderedFloat<f64>>,
    },
    /// Boolean flag.
    Flag { value: bool },
}

impl FilterValue {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        FilterValue::Scalar {
            value: value.into(),
        }
    }

    /// Builds a list value, sorting and removing duplicates.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        let mut values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
        values.sort();
        values.dedup();
        FilterValue::List { values }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range {
            min: min.map(number),
            max: max.map(number),
        }
    }

    pub fn flag(value: bool) -> Self {
        FilterValue::Flag { value }
    }

    /// True when the value constrains nothing (empty list, open range).
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::List { values } => values.is_empty(),
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
            FilterValue::Scalar { value } => value.as_str().is_some_and(str::is_empty),
            FilterValue::Flag { .. } => false,
        }
    }

    /// Canonical JSON form: object keys are emitted in lexicographic order
    /// and list members in sorted order, so equal values always serialize to
    /// the same text.
    pub fn canonical(&self) -> Value {
        match self {
            FilterValue::Scalar { value } => value.canonical(),
            FilterValue::List { values } => {
                let mut sorted = values.clone();
                sorted.sort();
                sorted.dedup();
                Value::Array(sorted.iter().map(Scalar::canonical).collect())
            },
            FilterValue::Range { min, max } => {
                let mut object = Map::new();
                if let Some(max) = max {
                    object.insert("max".to_string(), Value::from(number(max.into_inner()).into_inner()));
                }
                if let Some(min) = min {
                    object.insert("min".to_string(), Value::from(number(min.into_inner()).into_inner()));
                }
                Value::Object(object)
            },
            FilterValue::Flag { value } => Value::Bool(*value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_sorted_and_deduplicated() {
        let value = FilterValue::list(["condo", "apartment", "condo"]);
        assert_eq!(
            value,
            FilterValue::List {
                values: vec!["apartment".into(), "condo".into()]
            }
        );
    }

    #[test]
    fn negative_zero_is_folded() {
        assert_eq!(Scalar::from(-0.0).canonical().to_string(), "0.0");

        let value = FilterValue::range(Some(-0.0), None);
        assert_eq!(value.canonical().to_string(), r#"{"min":0.0}"#);
    }

    #[test]
    fn range_canonical_form_orders_keys() {
        let value = FilterValue::range(Some(100.0), Some(500.0));
        assert_eq!(value.canonical().to_string(), r#"{"max":500.0,"min":100.0}"#);
    }

    #[test]
    fn open_range_is_empty() {
        assert!(FilterValue::range(None, None).is_empty());
        assert!(!FilterValue::range(Some(1.0), None).is_empty());
    }

    #[test]
    fn numbers_and_text_do_not_collide() {
        let number = FilterValue::scalar(3_i64).canonical();
        let text = FilterValue::scalar("3").canonical();
        assert_ne!(number, text);
    }
}
