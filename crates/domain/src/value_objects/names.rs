//! Validated name newtype and name comparison policy
//!
//! Names are the keys cross-references use, so they are validated by construction:
//! - Non-empty after trimming
//! - Within length limits
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for entity names
const MAX_NAME_LENGTH: usize = 200;

// ============================================================================
// EntityName
// ============================================================================

/// A validated entity name (non-empty, <=200 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    /// Create a new validated entity name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidName` if:
    /// - The name is empty after trimming
    /// - The name exceeds 200 characters after trimming
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_name(name, "name cannot be blank"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::invalid_name(
                trimmed,
                format!("name cannot exceed {} characters", MAX_NAME_LENGTH),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EntityName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for EntityName {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EntityName> for String {
    fn from(name: EntityName) -> String {
        name.0
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// NameMatching
// ============================================================================

/// How two entity names are compared when checking uniqueness and references.
///
/// Scenario documents historically compare names exactly, so `CaseSensitive`
/// is the default. `CaseInsensitive` treats "Checkpoint A" and "checkpoint a"
/// as the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl NameMatching {
    /// Returns true if both names are non-blank and equal under this policy.
    ///
    /// Blank names never match anything, including another blank name.
    pub fn matches(self, a: &str, b: &str) -> bool {
        if is_blank(a) || is_blank(b) {
            return false;
        }
        match self {
            Self::CaseSensitive => a == b,
            Self::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// Returns true for empty or whitespace-only strings.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
