//! Helper types for port operations.

use chrono::{DateTime, Utc};
use gat_domain::DataCollectionId;
use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// Downloads
// =============================================================================

/// A file (or directory) produced for the user to download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadableFile {
    /// Relative URL the HTTP layer serves the result under
    pub url: String,
    /// Where the result was written on disk
    #[serde(skip)]
    pub path: PathBuf,
}

// =============================================================================
// Reports
// =============================================================================

/// One participant session log included in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLog {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Everything a report writer needs to describe a data set's participant data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub data_collection_id: DataCollectionId,
    pub data_collection_name: String,
    pub generated_at: DateTime<Utc>,
    pub logs: Vec<ReportLog>,
}

impl ReportRequest {
    pub fn total_size_bytes(&self) -> u64 {
        self.logs.iter().map(|l| l.size_bytes).sum()
    }
}
