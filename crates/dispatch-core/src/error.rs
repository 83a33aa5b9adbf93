//! # Error Types
//!
//! Domain-specific error types for dispatch-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dispatch-core errors (this file)                                      │
//! │  ├── QueryError       - Statement construction failures                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  dispatch-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: QueryError / ValidationError → DbError → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both kinds are raised before a statement reaches the database.

use thiserror::Error;

// =============================================================================
// Query Error
// =============================================================================

/// Errors raised while turning a template or patch into an executable query.
///
/// These are programming or caller errors, never driver errors. Nothing is
/// sent to the database when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The template references `:name` but the field map has no `name`.
    #[error("unbound parameter :{name}")]
    UnboundParameter { name: String },

    /// The field map carries a key that no placeholder in the template uses.
    #[error("parameter '{name}' is not referenced by the query")]
    UnusedParameter { name: String },

    /// A PATCH was requested with no fields to change.
    #[error("patch requires at least one field")]
    EmptyPatch,

    /// The field is managed by the store and cannot be set by a caller.
    #[error("field '{name}' is reserved and cannot be patched")]
    ReservedField { name: String },

    /// A table, column or key name is not a plain SQL identifier.
    #[error("'{name}' is not a valid SQL identifier")]
    InvalidIdentifier { name: String },

    /// The field is not in the entity's allow-list of patchable columns.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// The JSON value kind has no column representation.
    #[error("field '{field}' has unsupported value type {kind}")]
    UnsupportedValue { field: String, kind: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any statement is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with QueryError.
pub type QueryResult<T> = Result<T, QueryError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
