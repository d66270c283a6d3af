//! Raw participant data and course exports, and their size estimates.

use std::path::PathBuf;

use gat_domain::{DataCollection, DataCollectionId};

use super::progress::scaled_percent;
use super::{
    bytes_to_mb, DataCollectionError, DataCollectionServices, ProgressIndicator,
    BUILDING_DOWNLOAD_URL_TASK, GATHERED_EXPERIMENT_DATA, GATHERING_DATA_TASK, NO_PARTICIPANTS,
    OWNER_OR_MANAGER, TOTAL_PROGRESS, ZIPPING_DATA_TASK,
};
use crate::infrastructure::ports::{CourseFolderStore, DownloadableFile, RepoError};

/// What to collect for each participant log that exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LogSelection {
    /// The log file itself
    Files,
    /// The domain session folder holding the log
    SessionFolders,
}

impl DataCollectionServices {
    /// Locates participant logs, skipping participants without one.
    ///
    /// Progress runs from 0 to `share` percent.
    pub(super) async fn gather_logs(
        &self,
        item: &DataCollection,
        selection: LogSelection,
        progress: &ProgressIndicator,
        share: u32,
    ) -> Result<Vec<PathBuf>, DataCollectionError> {
        let logs = item.participant_logs();
        let total = logs.len();
        let mut found = Vec::new();

        for (index, filename) in logs.into_iter().enumerate() {
            progress.check_cancelled()?;
            // A participant who never reached the first course object has no log
            if let Some(filename) = filename {
                match self.logs.resolve(filename).await? {
                    Some(path) => found.push(match selection {
                        LogSelection::Files => path,
                        LogSelection::SessionFolders => match path.parent() {
                            Some(folder) => folder.to_path_buf(),
                            None => path,
                        },
                    }),
                    None => tracing::error!(
                        data_collection_id = %item.id(),
                        filename,
                        "Could not find the log file for a participant, continuing without it"
                    ),
                }
            }
            progress.set_percent_complete(scaled_percent(index + 1, total, share));
        }
        Ok(found)
    }

    fn export_name(&self, prefix: &str, id: DataCollectionId) -> String {
        format!(
            "{prefix}_{id}_{}",
            self.clock.now().format("%Y%m%d_%H%M%S")
        )
    }

    /// Packages the domain session folders of every participant. Owners and managers only.
    pub async fn export_data(
        &self,
        username: &str,
        id: DataCollectionId,
        progress: &ProgressIndicator,
    ) -> Result<DownloadableFile, DataCollectionError> {
        let item = self.require(id, "Failed to export data set results.").await?;
        if !item.has_permission(username, OWNER_OR_MANAGER) {
            return Err(DataCollectionError::permission_denied(
                "Failed to export data set results",
                format!("The user '{username}' doesn't have permissions to export the data set results for this data set with id '{id}'."),
            ));
        }
        tracing::info!(data_collection_id = %id, "Exporting data set results");

        progress.set_task_description(GATHERING_DATA_TASK);
        if item.participant_logs().is_empty() {
            return Err(DataCollectionError::rejected(
                format!(
                    "Unable to export results for the '{}' data set '{}'.",
                    item.data_set_type(),
                    item.name()
                ),
                NO_PARTICIPANTS,
            ));
        }
        let folders = self
            .gather_logs(
                &item,
                LogSelection::SessionFolders,
                progress,
                GATHERED_EXPERIMENT_DATA,
            )
            .await?;
        progress.set_percent_complete(GATHERED_EXPERIMENT_DATA);

        progress.check_cancelled()?;
        progress.set_task_description(ZIPPING_DATA_TASK);
        let file = self
            .archives
            .write_archive(&self.export_name("data", id), &folders)
            .await
            .map_err(|e| {
                DataCollectionError::failed(
                    format!("Failed to export results for the data set '{}'.", item.name()),
                    format!("There was an error while zipping the data set results :{e}"),
                )
            })?;

        progress.set_percent_complete(TOTAL_PROGRESS);
        progress.set_task_description(BUILDING_DOWNLOAD_URL_TASK);
        tracing::info!(
            data_collection_id = %id,
            folders = folders.len(),
            url = %file.url,
            "Finished exporting data set results"
        );
        Ok(file)
    }

    /// Total size in MB of the participant logs an export would contain.
    pub async fn export_data_size(
        &self,
        id: DataCollectionId,
        progress: &ProgressIndicator,
    ) -> Result<f64, DataCollectionError> {
        let item = self
            .require(id, "Failed to calculate data set export size.")
            .await?;
        if item.participant_logs().is_empty() {
            return Err(DataCollectionError::rejected(
                format!("Unable to export results for the data set '{}'.", item.name()),
                NO_PARTICIPANTS,
            ));
        }

        progress.set_task_description(GATHERING_DATA_TASK);
        let files = self
            .gather_logs(&item, LogSelection::Files, progress, GATHERED_EXPERIMENT_DATA)
            .await?;
        let mut total_bytes = 0;
        for file in &files {
            total_bytes += match self.logs.size_bytes(file).await {
                Ok(size) => size,
                Err(e) => {
                    // Sizes are best effort
                    tracing::warn!(path = %file.display(), error = %e, "Could not size participant log");
                    0
                }
            };
        }

        progress.set_percent_complete(TOTAL_PROGRESS);
        let size_mb = bytes_to_mb(total_bytes);
        tracing::info!(data_collection_id = %id, size_mb, "Calculated data set export size");
        Ok(size_mb)
    }

    /// Store holding the course folder of a data set. Legacy data sets own a copy
    /// under the experiments root; anything else, or a copy that is gone, falls
    /// back to the authored workspace.
    async fn course_store(
        &self,
        item: &DataCollection,
    ) -> Result<&dyn CourseFolderStore, RepoError> {
        if item.is_legacy() && self.experiments.exists(item.course_folder()).await? {
            return Ok(self.experiments.as_ref());
        }
        Ok(self.courses.as_ref())
    }

    async fn resolve_course(&self, item: &DataCollection) -> Result<PathBuf, RepoError> {
        self.course_store(item)
            .await?
            .resolve(item.course_folder())
            .await
    }

    async fn course_bytes(&self, item: &DataCollection) -> Result<u64, RepoError> {
        self.course_store(item)
            .await?
            .size_bytes(item.course_folder())
            .await
    }

    /// Packages the course folder of a data set. Owners and managers only.
    pub async fn export_course(
        &self,
        username: &str,
        id: DataCollectionId,
        progress: &ProgressIndicator,
    ) -> Result<DownloadableFile, DataCollectionError> {
        let item = self.require(id, "Failed to export data set course.").await?;
        if !item.has_permission(username, OWNER_OR_MANAGER) {
            return Err(DataCollectionError::permission_denied(
                "Failed to export data set course",
                format!("The user '{username}' doesn't have permissions to export the data set course for this data set with id '{id}'."),
            ));
        }

        let folder = item.course_folder();
        let course_path = self.resolve_course(&item).await.map_err(|e| {
            let reason = format!(
                "Failed to retrieve the course folder for the data set named '{}'.",
                item.name()
            );
            let details = format!(
                "There was a problem retrieving the data set course folder from '{folder}' : {e}"
            );
            if e.is_not_found() {
                DataCollectionError::not_found(reason, details)
            } else {
                DataCollectionError::failed(reason, details)
            }
        })?;

        progress.check_cancelled()?;
        progress.set_task_description(ZIPPING_DATA_TASK);
        let file = self
            .archives
            .write_archive(&self.export_name("course", id), &[course_path])
            .await
            .map_err(|e| {
                DataCollectionError::failed(
                    format!(
                        "Failed to export course folder for the data set named '{}'.",
                        item.name()
                    ),
                    format!("There was an error while exporting course :{e}"),
                )
            })?;

        progress.set_percent_complete(TOTAL_PROGRESS);
        progress.set_task_description(BUILDING_DOWNLOAD_URL_TASK);
        tracing::info!(data_collection_id = %id, url = %file.url, "Exported data set course");
        Ok(file)
    }

    /// Size in MB of the data set's course folder.
    pub async fn course_size(&self, id: DataCollectionId) -> Result<f64, DataCollectionError> {
        let item = self
            .require(id, "Failed to calculate the data set course folder size.")
            .await?;
        let folder = item.course_folder();

        let bytes = self.course_bytes(&item).await.map_err(|e| {
            if e.is_not_found() {
                DataCollectionError::not_found(
                    format!(
                        "Failed to retrieve the course folder for the data set named '{}'.",
                        item.name()
                    ),
                    format!("There was a problem retrieving the data set course folder of '{folder}' : {e}"),
                )
            } else {
                DataCollectionError::failed(
                    "Failed to calculate the course export file size.",
                    format!("There was a problem while calculating the file size of the course export : {e}"),
                )
            }
        })?;
        Ok(bytes_to_mb(bytes))
    }
}
