//! Result-with-warnings for best-effort cache operations.

use crate::error::CacheError;

/// The value of a cache operation together with any non-fatal failures
/// that were swallowed to produce it.
///
/// A degraded outcome still carries a usable value (a miss, a no-op, a
/// zero count); callers that care can inspect [`warnings`](Self::warnings),
/// everyone else just takes [`into_value`](Self::into_value).
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct CacheOutcome<T> {
    value: T,
    warnings: Vec<CacheError>,
}

impl<T> CacheOutcome<T> {
    /// An outcome with no warnings.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// An outcome produced by falling back after `warning`.
    pub fn degraded(value: T, warning: CacheError) -> Self {
        Self {
            value,
            warnings: vec![warning],
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn warnings(&self) -> &[CacheError] {
        &self.warnings
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_parts(self) -> (T, Vec<CacheError>) {
        (self.value, self.warnings)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheOutcome<U> {
        CacheOutcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn push_warning(&mut self, warning: CacheError) {
        self.warnings.push(warning);
    }

    /// Takes the value of `other`, moving its warnings into `self`.
    pub fn absorb<U>(&mut self, other: CacheOutcome<U>) -> U {
        self.warnings.extend(other.warnings);
        other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_outcome_is_not_degraded() {
        let outcome = CacheOutcome::clean(3);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.into_value(), 3);
    }

    #[test]
    fn absorb_collects_warnings() {
        let mut total = CacheOutcome::clean(0usize);
        let deleted = total.absorb(CacheOutcome::degraded(
            0usize,
            CacheError::unavailable("redis", "down"),
        ));

        assert_eq!(deleted, 0);
        assert_eq!(total.warnings().len(), 1);
    }

    #[test]
    fn map_keeps_warnings() {
        let outcome = CacheOutcome::degraded(2, CacheError::serialization("k", "x")).map(|v| v * 2);
        assert_eq!(*outcome.value(), 4);
        assert!(outcome.is_degraded());
    }
}
