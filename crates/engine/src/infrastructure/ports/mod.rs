//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - Participant logs and course folders (could swap local disk -> object storage)
//! - Archive and report output
//! - Clock (for testing)

mod error;
mod files;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::DataCollectionRepo;

// =============================================================================
// File Ports
// =============================================================================
pub use files::{ArchiveWriter, CourseFolderStore, ReportWriter, SessionLogStore};

// =============================================================================
// Types from types module (re-export for visibility)
// =============================================================================
pub use types::{DownloadableFile, ReportLog, ReportRequest};

pub use error::RepoError;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::MockDataCollectionRepo;

#[cfg(test)]
pub use files::{MockArchiveWriter, MockCourseFolderStore, MockReportWriter, MockSessionLogStore};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;
