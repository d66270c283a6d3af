//! Event report generation over a data set's participant logs.

use gat_domain::DataCollectionId;

use super::export::LogSelection;
use super::progress::scaled_percent;
use super::{
    mb_to_bytes, DataCollectionError, DataCollectionServices, DeploymentMode, ProgressIndicator,
    DETERMINE_PARTICIPANT_DATA_SIZE_TASK, GATHERED_COLUMN_DATA, GATHERED_EXPERIMENT_DATA,
    GATHERING_DATA_TASK, INIT_GENERATE_REPORT_TASK, NO_PARTICIPANTS, REPORT_CREATED,
    STARTING_REPORT_GENERATION_TASK,
};
use crate::infrastructure::ports::{DownloadableFile, ReportLog, ReportRequest};

impl DataCollectionServices {
    /// Builds the event report for a data set. Any role on the data set may run it.
    ///
    /// In server deployments the participant data must stay under the
    /// configured size limit.
    pub async fn generate_report(
        &self,
        username: &str,
        id: DataCollectionId,
        progress: &ProgressIndicator,
    ) -> Result<DownloadableFile, DataCollectionError> {
        if !progress.has_subtask() {
            progress
                .subtask()
                .set_task_description(INIT_GENERATE_REPORT_TASK);
        }
        let subtask = progress.subtask();

        let item = self.require(id, "Failed to export data set report.").await?;
        if !item.can_run_reports(username) {
            return Err(DataCollectionError::permission_denied(
                "Failed to generated report",
                format!("The user '{username}' doesn't have permissions to run reports on this data set."),
            ));
        }
        if item.participant_logs().is_empty() {
            return Err(DataCollectionError::rejected(
                format!(
                    "Unable to export the report for the '{}' data set '{}'.",
                    item.data_set_type(),
                    item.name()
                ),
                NO_PARTICIPANTS,
            ));
        }
        tracing::info!(data_collection_id = %id, "Generating data set report");

        progress.set_task_description(GATHERING_DATA_TASK);
        let files = self
            .gather_logs(&item, LogSelection::Files, progress, GATHERED_EXPERIMENT_DATA)
            .await?;
        progress.set_percent_complete(GATHERED_EXPERIMENT_DATA);

        let enforce_limit = self.settings.deployment_mode == DeploymentMode::Server;
        if enforce_limit {
            progress.set_task_description(DETERMINE_PARTICIPANT_DATA_SIZE_TASK);
        }
        let max_bytes = mb_to_bytes(self.settings.max_participant_data_size_mb);

        let total = files.len();
        let mut logs = Vec::with_capacity(total);
        let mut total_bytes: u64 = 0;
        for (index, path) in files.into_iter().enumerate() {
            progress.check_cancelled()?;
            let size_bytes = match self.logs.size_bytes(&path).await {
                Ok(size) => size,
                Err(e) => {
                    // Sizes are best effort
                    tracing::warn!(path = %path.display(), error = %e, "Could not size participant log");
                    0
                }
            };
            total_bytes = total_bytes.saturating_add(size_bytes);
            if enforce_limit && total_bytes > max_bytes {
                return Err(DataCollectionError::rejected(
                    format!("Failed to create report for the data set named '{}'.", item.name()),
                    format!(
                        "The total file size for the participant data is over {} MB.  The server is unable to handle a request of this size. \
                         Export the raw participant data with 'Export Raw Data' and generate the report on a local desktop installation instead.",
                        self.settings.max_participant_data_size_mb
                    ),
                ));
            }
            logs.push(ReportLog { path, size_bytes });

            subtask.set_percent_complete(scaled_percent(index + 1, total, 100));
            progress.set_percent_complete(
                GATHERED_EXPERIMENT_DATA
                    + scaled_percent(index + 1, total, GATHERED_COLUMN_DATA - GATHERED_EXPERIMENT_DATA),
            );
        }
        progress.set_percent_complete(GATHERED_COLUMN_DATA);

        progress.check_cancelled()?;
        progress.set_task_description(STARTING_REPORT_GENERATION_TASK);
        let request = ReportRequest {
            data_collection_id: id,
            data_collection_name: item.name().to_string(),
            generated_at: self.clock.now(),
            logs,
        };
        let file = self.reports.write_report(&request).await.map_err(|e| {
            DataCollectionError::failed(
                format!("Failed to create report for the data set named '{}'.", item.name()),
                format!("There was an error while writing the report : {e}"),
            )
        })?;

        progress.set_percent_complete(REPORT_CREATED);
        tracing::info!(
            data_collection_id = %id,
            logs = request.logs.len(),
            total_bytes,
            url = %file.url,
            "Finished data set report"
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use gat_domain::{DataCollectionPermission, DataCollectionRole, DataSetType};

    use crate::infrastructure::ports::RepoError;
    use crate::use_cases::data_collection::test_support::{data_set, subject, Mocks};
    use crate::use_cases::data_collection::{DataCollectionSettings, DetailKind};

    fn stored(mocks: &mut Mocks, item: gat_domain::DataCollection) {
        mocks
            .repo
            .expect_get()
            .returning(move |_| Ok(Some(item.clone())));
        mocks
            .logs
            .expect_resolve()
            .returning(|name| Ok(Some(PathBuf::from("/logs").join(name))));
    }

    #[tokio::test]
    async fn researcher_can_generate_report() {
        let item = data_set(DataSetType::Experiment)
            .with_permissions(vec![
                DataCollectionPermission::new("alice", DataCollectionRole::Owner),
                DataCollectionPermission::new("carol", DataCollectionRole::Researcher),
            ])
            .with_subject(subject(1, Some("a.log")))
            .with_subject(subject(2, Some("b.log")));
        let id = item.id();

        let mut mocks = Mocks::new();
        stored(&mut mocks, item);
        mocks.logs.expect_size_bytes().returning(|_| Ok(100));
        mocks
            .reports
            .expect_write_report()
            .withf(move |r| r.data_collection_id == id && r.total_size_bytes() == 200)
            .times(1)
            .returning(|_| {
                Ok(DownloadableFile {
                    url: "/exports/report.json".into(),
                    path: PathBuf::from("/export/report.json"),
                })
            });
        let services = mocks.build();

        let progress = ProgressIndicator::new();
        let file = services
            .generate_report("Carol", id, &progress)
            .await
            .expect("report");

        assert_eq!(file.url, "/exports/report.json");
        assert_eq!(progress.percent_complete(), 100);
        assert_eq!(progress.subtask().percent_complete(), 100);
        assert_eq!(
            progress.snapshot().task_description.as_deref(),
            Some(STARTING_REPORT_GENERATION_TASK)
        );
    }

    #[tokio::test]
    async fn outsider_cannot_generate_report() {
        let item = data_set(DataSetType::Experiment).with_subject(subject(1, Some("a.log")));
        let id = item.id();
        let mut mocks = Mocks::new();
        stored(&mut mocks, item);
        mocks.reports.expect_write_report().never();
        let services = mocks.build();

        let err = services
            .generate_report("mallory", id, &ProgressIndicator::new())
            .await
            .expect_err("no role");
        assert_eq!(err.to_string(), "Failed to generated report");
        assert_eq!(err.kind(), Some(DetailKind::PermissionDenied));
    }

    #[tokio::test]
    async fn server_mode_enforces_size_limit() {
        let item = data_set(DataSetType::Experiment)
            .with_subject(subject(1, Some("a.log")))
            .with_subject(subject(2, Some("b.log")));
        let id = item.id();
        let mut mocks = Mocks::new();
        mocks.settings = DataCollectionSettings {
            deployment_mode: DeploymentMode::Server,
            max_participant_data_size_mb: 1,
        };
        stored(&mut mocks, item);
        mocks
            .logs
            .expect_size_bytes()
            .returning(|_| Ok(600 * 1024));
        mocks.reports.expect_write_report().never();
        let services = mocks.build();

        let err = services
            .generate_report("alice", id, &ProgressIndicator::new())
            .await
            .expect_err("too large");
        assert_eq!(err.kind(), Some(DetailKind::Rejected));
        assert_eq!(
            err.to_string(),
            "Failed to create report for the data set named 'Pilot Study'."
        );
    }

    #[tokio::test]
    async fn desktop_mode_ignores_size_limit() {
        let item = data_set(DataSetType::Experiment).with_subject(subject(1, Some("a.log")));
        let id = item.id();
        let mut mocks = Mocks::new();
        mocks.settings.max_participant_data_size_mb = 1;
        stored(&mut mocks, item);
        mocks
            .logs
            .expect_size_bytes()
            .returning(|_| Ok(5 * 1024 * 1024));
        mocks.reports.expect_write_report().times(1).returning(|_| {
            Ok(DownloadableFile {
                url: "/exports/r.json".into(),
                path: PathBuf::from("/export/r.json"),
            })
        });
        let services = mocks.build();

        services
            .generate_report("alice", id, &ProgressIndicator::new())
            .await
            .expect("report");
    }

    #[tokio::test]
    async fn writer_failure_is_reported() {
        let item = data_set(DataSetType::Experiment).with_subject(subject(1, Some("a.log")));
        let id = item.id();
        let mut mocks = Mocks::new();
        stored(&mut mocks, item);
        mocks.logs.expect_size_bytes().returning(|_| Ok(1));
        mocks
            .reports
            .expect_write_report()
            .returning(|_| Err(RepoError::serialization("bad manifest")));
        let services = mocks.build();

        let err = services
            .generate_report("alice", id, &ProgressIndicator::new())
            .await
            .expect_err("writer failed");
        assert_eq!(err.kind(), Some(DetailKind::Failed));
    }

    #[tokio::test]
    async fn existing_subtask_keeps_its_description() {
        let mut mocks = Mocks::new();
        mocks.repo.expect_get().returning(|_| Ok(None));
        let services = mocks.build();

        let progress = ProgressIndicator::new();
        progress.subtask().set_task_description("Caller supplied");
        let err = services
            .generate_report("alice", DataCollectionId::new(), &progress)
            .await
            .expect_err("missing");

        assert_eq!(err.to_string(), "Failed to export data set report.");
        assert_eq!(
            progress.subtask().snapshot().task_description.as_deref(),
            Some("Caller supplied")
        );
    }
}
