//! Unified error types for the domain layer
//!
//! Every scenario authoring command and every data-collection rule reports
//! failures through [`DomainError`], so adapters never fall back to strings.

use thiserror::Error;

use crate::authoring::ReferenceKind;
use crate::entities::PlaceKind;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A name is blank, too long, or already used by another entity in the same scope
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A place of interest has fewer coordinates than its shape requires
    #[error("{kind} requires at least {required} coordinates but has {actual}")]
    InsufficientPoints {
        kind: PlaceKind,
        required: usize,
        actual: usize,
    },

    /// A rename or delete was requested for an entity no longer in the document
    #[error("No {kind} named '{name}' exists in the scenario")]
    MissingReferenceTarget { kind: ReferenceKind, name: String },

    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates an invalid name error.
    ///
    /// # Example
    /// ```ignore
    /// if !registry.is_name_unique(kind, &name, Some(id)) {
    ///     return Err(DomainError::invalid_name(name, "already in use"));
    /// }
    /// ```
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn insufficient_points(kind: PlaceKind, required: usize, actual: usize) -> Self {
        Self::InsufficientPoints {
            kind,
            required,
            actual,
        }
    }

    pub fn missing_reference_target(kind: ReferenceKind, name: impl Into<String>) -> Self {
        Self::MissingReferenceTarget {
            kind,
            name: name.into(),
        }
    }

    /// Creates a validation error for business rule violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
