//! Errors surfaced by the data collection services.

use gat_domain::DomainError;

use crate::infrastructure::ports::RepoError;

/// What a [`DataCollectionError::Detailed`] failure means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    /// The data set (or its course folder) does not exist
    NotFound,
    /// The acting user lacks the required role
    PermissionDenied,
    /// The request conflicts with the current state (duplicate course tile, no participants, size limit)
    Rejected,
    /// A store or writer failed part way through
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum DataCollectionError {
    /// A user-facing reason plus technical details for the log or an expandable panel.
    #[error("{reason}")]
    Detailed {
        kind: DetailKind,
        reason: String,
        details: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl DataCollectionError {
    fn detailed(kind: DetailKind, reason: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Detailed {
            kind,
            reason: reason.into(),
            details: details.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>, details: impl Into<String>) -> Self {
        Self::detailed(DetailKind::NotFound, reason, details)
    }

    pub fn permission_denied(reason: impl Into<String>, details: impl Into<String>) -> Self {
        Self::detailed(DetailKind::PermissionDenied, reason, details)
    }

    pub fn rejected(reason: impl Into<String>, details: impl Into<String>) -> Self {
        Self::detailed(DetailKind::Rejected, reason, details)
    }

    pub fn failed(reason: impl Into<String>, details: impl Into<String>) -> Self {
        Self::detailed(DetailKind::Failed, reason, details)
    }

    /// Kind of a detailed failure, `None` for every other variant.
    pub fn kind(&self) -> Option<DetailKind> {
        match self {
            Self::Detailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Detailed { details, .. } => Some(details),
            _ => None,
        }
    }
}
