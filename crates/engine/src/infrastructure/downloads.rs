//! Writers that turn participant data into files the HTTP layer can serve.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::infrastructure::file_stores::join_inside;
use crate::infrastructure::ports::{
    ArchiveWriter, DownloadableFile, RepoError, ReportRequest, ReportWriter,
};

/// URL prefix the export directory is served under.
pub const EXPORT_URL_PREFIX: &str = "/exports";

fn download_url(name: &str) -> String {
    format!("{EXPORT_URL_PREFIX}/{name}")
}

fn copy_recursive(source: &Path, target: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::fs::create_dir_all(target)?;
        for entry in std::fs::read_dir(source)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &target.join(entry.file_name()))?;
        }
    } else {
        std::fs::copy(source, target)?;
    }
    Ok(())
}

// =============================================================================
// Archive
// =============================================================================

/// Copies every source into one directory per export below the export root.
pub struct DirectoryArchiveWriter {
    export_root: PathBuf,
}

impl DirectoryArchiveWriter {
    pub fn new(export_root: impl Into<PathBuf>) -> Self {
        Self {
            export_root: export_root.into(),
        }
    }
}

#[async_trait]
impl ArchiveWriter for DirectoryArchiveWriter {
    async fn write_archive(
        &self,
        name: &str,
        sources: &[PathBuf],
    ) -> Result<DownloadableFile, RepoError> {
        let target = join_inside(&self.export_root, name)?;
        let sources = sources.to_vec();
        let archive_dir = target.clone();

        let copied = tokio::task::spawn_blocking(move || -> std::io::Result<usize> {
            std::fs::create_dir_all(&archive_dir)?;
            let mut seen = HashSet::new();
            for source in sources.iter().filter(|s| seen.insert(s.as_path())) {
                let Some(file_name) = source.file_name() else {
                    continue;
                };
                copy_recursive(source, &archive_dir.join(file_name))?;
            }
            Ok(seen.len())
        })
        .await
        .map_err(|e| RepoError::io("archive_write", e))?
        .map_err(|e| RepoError::io("archive_write", e))?;
        tracing::debug!(archive = %target.display(), copied, "Wrote export archive");

        Ok(DownloadableFile {
            url: download_url(name),
            path: target,
        })
    }
}

// =============================================================================
// Report
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportManifest<'a> {
    #[serde(flatten)]
    request: &'a ReportRequest,
    log_count: usize,
    total_size_bytes: u64,
}

/// Describes the participant logs of a report in a JSON manifest.
pub struct ManifestReportWriter {
    export_root: PathBuf,
}

impl ManifestReportWriter {
    pub fn new(export_root: impl Into<PathBuf>) -> Self {
        Self {
            export_root: export_root.into(),
        }
    }
}

#[async_trait]
impl ReportWriter for ManifestReportWriter {
    async fn write_report(&self, request: &ReportRequest) -> Result<DownloadableFile, RepoError> {
        let name = format!(
            "report_{}_{}.json",
            request.data_collection_id,
            request.generated_at.format("%Y%m%d_%H%M%S")
        );
        let manifest = ReportManifest {
            request,
            log_count: request.logs.len(),
            total_size_bytes: request.total_size_bytes(),
        };
        let json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| RepoError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.export_root)
            .await
            .map_err(|e| RepoError::io("report_write", e))?;
        let path = self.export_root.join(&name);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| RepoError::io("report_write", e))?;

        Ok(DownloadableFile {
            url: download_url(&name),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gat_domain::DataCollectionId;

    use crate::infrastructure::ports::ReportLog;

    #[tokio::test]
    async fn archive_copies_files_and_directories() {
        let source = tempfile::tempdir().expect("tempdir");
        let export = tempfile::tempdir().expect("tempdir");
        let logs = source.path().join("domainSession1");
        std::fs::create_dir_all(&logs).expect("mkdir");
        std::fs::write(logs.join("messages.log"), b"log").expect("write");
        let single = source.path().join("summary.txt");
        std::fs::write(&single, b"summary").expect("write");

        let writer = DirectoryArchiveWriter::new(export.path());
        let result = writer
            .write_archive("data_1", &[logs.clone(), single, logs])
            .await
            .expect("archive");

        assert_eq!(result.url, "/exports/data_1");
        let copied = std::fs::read(result.path.join("domainSession1").join("messages.log"))
            .expect("copied log");
        assert_eq!(copied, b"log");
        assert!(result.path.join("summary.txt").exists());
    }

    #[tokio::test]
    async fn archive_name_must_stay_inside_export_root() {
        let export = tempfile::tempdir().expect("tempdir");
        let writer = DirectoryArchiveWriter::new(export.path());
        let result = writer.write_archive("../escape", &[]).await;
        assert!(matches!(result, Err(RepoError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn report_manifest_lists_logs() {
        let export = tempfile::tempdir().expect("tempdir");
        let writer = ManifestReportWriter::new(export.path());
        let request = ReportRequest {
            data_collection_id: DataCollectionId::new(),
            data_collection_name: "Pilot".into(),
            generated_at: Utc
                .timestamp_opt(1_700_000_000, 0)
                .single()
                .expect("valid timestamp"),
            logs: vec![
                ReportLog {
                    path: PathBuf::from("a.log"),
                    size_bytes: 10,
                },
                ReportLog {
                    path: PathBuf::from("b.log"),
                    size_bytes: 32,
                },
            ],
        };

        let result = writer.write_report(&request).await.expect("report");
        assert!(result.url.starts_with("/exports/report_"));

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&result.path).expect("read manifest"))
                .expect("valid json");
        assert_eq!(written["dataCollectionName"], "Pilot");
        assert_eq!(written["logCount"], 2);
        assert_eq!(written["totalSizeBytes"], 42);
    }
}
