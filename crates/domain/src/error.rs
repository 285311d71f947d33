//! Unified error type for the rules core.
//!
//! There are no fatal errors here: malformed persisted data is recovered by
//! clamping, so the only failures are user-facing validation messages and
//! rule-data loading problems surfaced at startup.

use thiserror::Error;

/// Unified error type for domain operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A wizard step or mutator rejected its input. The message is shown to
    /// the player verbatim; no state was changed.
    #[error("{0}")]
    Validation(String),

    /// Static rule tables failed to load or are internally inconsistent.
    /// Raised once at startup; there is no partial-table operation mode.
    #[error("Rule data error: {0}")]
    RuleData(String),

    /// Undo was requested with an empty build log.
    #[error("No level up to undo")]
    NothingToUndo,
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Creates a rule-data error for table loading/lookup failures.
    pub fn rule_data(msg: impl Into<String>) -> Self {
        DomainError::RuleData(msg.into())
    }
}
