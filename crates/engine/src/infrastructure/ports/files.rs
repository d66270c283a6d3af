//! File system port traits: participant logs, course folders, and the
//! writers that turn them into downloads.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{DownloadableFile, RepoError, ReportRequest};

// =============================================================================
// Stores
// =============================================================================

/// Participant session logs, addressed by the filename recorded on a subject.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionLogStore: Send + Sync {
    /// Full path of the log, or `None` if no such file exists.
    async fn resolve(&self, filename: &str) -> Result<Option<PathBuf>, RepoError>;

    /// Returns false if the log was already gone.
    async fn delete(&self, filename: &str) -> Result<bool, RepoError>;

    /// Size of a file, or of everything below a directory.
    async fn size_bytes(&self, path: &Path) -> Result<u64, RepoError>;
}

/// Course folders inside the workspace.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseFolderStore: Send + Sync {
    async fn exists(&self, course_folder: &str) -> Result<bool, RepoError>;

    /// Recursively removes the folder.
    async fn delete(&self, course_folder: &str) -> Result<(), RepoError>;

    async fn size_bytes(&self, course_folder: &str) -> Result<u64, RepoError>;

    /// Full path of an existing folder.
    async fn resolve(&self, course_folder: &str) -> Result<PathBuf, RepoError>;
}

// =============================================================================
// Writers
// =============================================================================

/// Packages files and directories into one downloadable result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveWriter: Send + Sync {
    async fn write_archive(
        &self,
        name: &str,
        sources: &[PathBuf],
    ) -> Result<DownloadableFile, RepoError>;
}

/// Produces the event report for a data set's participant logs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportWriter: Send + Sync {
    async fn write_report(&self, request: &ReportRequest) -> Result<DownloadableFile, RepoError>;
}
