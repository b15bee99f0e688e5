//! Request extractors.

pub mod path;
pub mod query;
pub mod user;

pub use path::{PropertyPath, UserPath};
pub use query::SearchQuery;
pub use user::{ActingUser, USER_ID_HEADER};
