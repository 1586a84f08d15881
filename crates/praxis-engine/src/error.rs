//! Error types for the rewards engine.
//!
//! The taxonomy mirrors how callers must react:
//!
//! - [`EngineError::Validation`] and [`EngineError::NotFound`] propagate to
//!   the caller immediately, before any write.
//! - [`EngineError::Conflict`] marks a benign check-then-act race; the
//!   service layer recovers it with an idempotent re-read and callers
//!   should never observe it.
//! - [`EngineError::Consistency`] flags a state that the monotonic design
//!   rules out (e.g. a computed achievement tier below the stored one). It
//!   is logged and the stored value kept, never silently downgraded.
//! - [`EngineError::Store`] wraps unexpected datastore failures.

/// Errors that can occur in the rewards engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Input was rejected before any write.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of entity was looked up (e.g. `"exercise"`).
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// A unique-constraint violation on a concurrent duplicate write.
    /// Recovered internally; never surfaced to callers.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A state the monotonic design makes impossible was detected.
    #[error("consistency violation: {0}")]
    Consistency(String),

    /// The underlying datastore failed in an unexpected way.
    #[error("datastore error: {0}")]
    Store(String),
}

impl EngineError {
    /// Shorthand for a [`EngineError::NotFound`] with a displayable ID.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_kind_and_id() {
        let err = EngineError::not_found("exercise", "abc-123");
        assert_eq!(err.to_string(), "exercise not found: abc-123");
    }
}
