//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EstateError, Result};

/// Identifier of a property listing.
///
/// # Example
///
/// ```
/// use estate_core::PropertyId;
///
/// let id = PropertyId::new("PROP0001");
/// assert_eq!(id.as_str(), "PROP0001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(String);

impl PropertyId {
    /// Creates a new PropertyId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a PropertyId, rejecting blank input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EstateError::invalid_identifier(raw, "property id cannot be empty"));
        }
        Ok(Self::new(trimmed))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PropertyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of the user owning listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a UserId, rejecting blank input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EstateError::invalid_identifier(raw, "user id cannot be empty"));
        }
        Ok(Self::new(trimmed))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id = PropertyId::parse("  PROP0001 ").unwrap();
        assert_eq!(id.as_str(), "PROP0001");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(PropertyId::parse("   ").is_err());
        assert!(UserId::parse("").is_err());
    }

    #[test]
    fn serializes_transparently() {
        let id = UserId::new("user-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""user-42""#);
    }
}
