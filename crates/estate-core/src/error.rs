//! Error types for Estate.
//!
//! Domain-level failures: malformed identifiers, invalid listing payloads
//! and unparseable filter input. Transport and cache failures have their
//! own error types in the crates that own those concerns.
//!
//! # Example
//!
//! ```
//! use estate_core::{EstateError, Result};
//!
//! fn parse_price(raw: &str) -> Result<f64> {
//!     raw.parse()
//!         .map_err(|_| EstateError::invalid_filter("minPrice", "not a number"))
//! }
//!
//! assert!(parse_price("abc").is_err());
//! ```

use thiserror::Error;

/// Main error type for Estate domain operations.
#[derive(Debug, Error)]
pub enum EstateError {
    /// An identifier was empty or malformed.
    #[error("Invalid identifier '{value}': {reason}")]
    InvalidIdentifier {
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A filter parameter could not be interpreted.
    #[error("Invalid filter '{field}': {reason}")]
    InvalidFilter {
        /// Query key that failed
        field: String,
        /// Description of the problem
        reason: String,
    },

    /// A listing payload failed validation.
    #[error("Validation error for field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// Error encoding or decoding a domain value.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EstateError {
    /// Creates an InvalidIdentifier error.
    pub fn invalid_identifier(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidFilter error.
    pub fn invalid_filter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a ValidationError.
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns true if the error was caused by caller input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier { .. } | Self::InvalidFilter { .. } | Self::ValidationError { .. }
        )
    }
}

/// Type alias for Results with EstateError.
pub type Result<T> = std::result::Result<T, EstateError>;
