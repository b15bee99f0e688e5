//! Search filter model.
//!
//! Request query parameters are folded into a [`FilterSet`]: a map from a
//! closed set of [`FilterField`]s to typed [`FilterValue`]s plus sort and
//! pagination. The set has a canonical string form that does not depend on
//! the order parameters arrived in, which is what cache keys are derived
//! from.

mod field;
mod set;
mod value;

pub use field::{Bound, FilterField, FilterKind, SortField, SortOrder};
pub use set::{FilterSet, Pagination};
pub use value::{FilterValue, Scalar};
