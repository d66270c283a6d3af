//! Creating, listing, updating, ending, and deleting data sets.

use std::path::Path;

use gat_domain::{is_blank, DataCollection, DataCollectionId, DataSetType, EntityName};
use serde::Deserialize;

use super::progress::scaled_percent;
use super::{
    DataCollectionError, DataCollectionServices, ProgressIndicator, DELETING_COURSE_COPY_TASK,
    DELETING_DB_ENTRIES_TASK, DELETING_PARTICIPANT_DATA_TASK, EXPERIMENT_COURSE_DELETED,
    OWNER, OWNER_OR_MANAGER, SUBJECT_DATA_DELETED, TOTAL_PROGRESS,
};

/// Request to publish a course for data collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDataCollection {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Workspace-relative folder of the course
    pub course_folder: String,
    /// Course record the data set collects on
    pub source_course_id: String,
    pub data_set_type: DataSetType,
}

impl DataCollectionServices {
    /// Publishes a course. Only one course tile data set may exist per course folder.
    pub async fn create(
        &self,
        username: &str,
        request: CreateDataCollection,
    ) -> Result<DataCollection, DataCollectionError> {
        if is_blank(&request.course_folder) {
            return Err(DataCollectionError::InvalidArgument(
                "The course folder cannot be blank".into(),
            ));
        }
        let name = EntityName::new(request.name)?;
        let type_label = request.data_set_type.to_string().to_lowercase();

        if !self.courses.exists(&request.course_folder).await? {
            return Err(DataCollectionError::rejected(
                format!("Failed to create the {type_label} named '{name}' because the course could not be found."),
                format!(
                    "The course folder '{}' does not exist in the workspace.",
                    request.course_folder
                ),
            ));
        }

        if request.data_set_type == DataSetType::CourseData
            && self
                .find_course_tile(&request.course_folder)
                .await?
                .is_some()
        {
            return Err(DataCollectionError::rejected(
                format!("There is already a 'Course Tile' Published Course for the '{name}' course."),
                "Only one 'course tile' published course is allowed per course because the data collected corresponds to anyone that takes this course rather than a unique URL (e.g. Experiments).",
            ));
        }

        if is_blank(&request.source_course_id) {
            return Err(DataCollectionError::failed(
                "Failed to create the data set entry in the database.",
                format!(
                    "An error occurred while creating the course record for course: {}",
                    request.course_folder
                ),
            ));
        }

        let mut item = DataCollection::new(
            name,
            username,
            request.course_folder,
            request.data_set_type,
            self.clock.now(),
        )?
        .with_source_course_id(request.source_course_id);
        if let Some(description) = request.description.filter(|d| !is_blank(d)) {
            item = item.with_description(description);
        }

        self.repo.save(&item).await?;
        tracing::info!(
            data_collection_id = %item.id(),
            data_set_type = %item.data_set_type(),
            course_folder = %item.course_folder(),
            "Created data set"
        );
        Ok(item)
    }

    /// Returns the course tile data set for a course folder, creating it if needed.
    pub async fn ensure_course_tile(
        &self,
        username: &str,
        course_folder: &str,
        course_name: &str,
        source_course_id: &str,
    ) -> Result<DataCollection, DataCollectionError> {
        if let Some(existing) = self.find_course_tile(course_folder).await? {
            tracing::debug!(data_collection_id = %existing.id(), "Reusing course tile data set");
            return Ok(existing);
        }
        self.create(
            username,
            CreateDataCollection {
                name: course_name.to_string(),
                description: None,
                course_folder: course_folder.to_string(),
                source_course_id: source_course_id.to_string(),
                data_set_type: DataSetType::CourseData,
            },
        )
        .await
    }

    async fn find_course_tile(
        &self,
        course_folder: &str,
    ) -> Result<Option<DataCollection>, DataCollectionError> {
        Ok(self
            .repo
            .list_for_course_folder(course_folder)
            .await?
            .into_iter()
            .find(|d| d.data_set_type() == DataSetType::CourseData))
    }

    /// Deletes a data set, its participant logs, and (for legacy experiments) its course copy.
    ///
    /// Only owners may delete.
    pub async fn delete(
        &self,
        username: &str,
        id: DataCollectionId,
        progress: &ProgressIndicator,
    ) -> Result<(), DataCollectionError> {
        let item = self.require(id, "Failed to delete the data set.").await?;
        if !item.has_permission(username, OWNER) {
            return Err(DataCollectionError::permission_denied(
                "Failed to delete data set",
                format!("The user '{username}' doesn't have permissions to delete this data set with id '{id}'."),
            ));
        }
        tracing::info!(data_collection_id = %id, name = %item.name(), "Deleting data set");

        if item.data_set_type() == DataSetType::Experiment {
            self.delete_participant_logs(&item, progress).await?;
            progress.set_percent_complete(SUBJECT_DATA_DELETED);

            if item.is_legacy() {
                self.delete_course_copy(&item, progress).await?;
            }
        }

        progress.increase_percent_complete(EXPERIMENT_COURSE_DELETED);
        progress.check_cancelled()?;
        progress.set_task_description(DELETING_DB_ENTRIES_TASK);
        if !self.repo.delete(id).await? {
            tracing::warn!(data_collection_id = %id, "Data set row was already gone");
        }

        progress.set_percent_complete(TOTAL_PROGRESS);
        tracing::info!(data_collection_id = %id, "Finished deleting data set");
        Ok(())
    }

    async fn delete_participant_logs(
        &self,
        item: &DataCollection,
        progress: &ProgressIndicator,
    ) -> Result<(), DataCollectionError> {
        progress.set_task_description(DELETING_PARTICIPANT_DATA_TASK);
        let logs = item.participant_logs();
        let total = logs.len();

        for (index, filename) in logs.into_iter().enumerate() {
            progress.check_cancelled()?;
            if let Some(filename) = filename {
                match self.logs.delete(filename).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!(filename, "Participant log was already deleted")
                    }
                    Err(e) => {
                        return Err(DataCollectionError::failed(
                            format!("Failed to fully delete the data set named '{}'.", item.name()),
                            format!("There was an error while deleting participant's data : {e}"),
                        ))
                    }
                }
            }
            progress.set_percent_complete(scaled_percent(index + 1, total, SUBJECT_DATA_DELETED));
        }
        Ok(())
    }

    async fn delete_course_copy(
        &self,
        item: &DataCollection,
        progress: &ProgressIndicator,
    ) -> Result<(), DataCollectionError> {
        progress.check_cancelled()?;
        progress.set_task_description(DELETING_COURSE_COPY_TASK);
        let fail = |e: &dyn std::fmt::Display| {
            DataCollectionError::failed(
                format!("Failed to fully delete the data set named '{}'.", item.name()),
                format!("The participant's data was deleted already, however there was an error while deleteing the data set's copy of the course folder : {e}"),
            )
        };

        // The copy sits in a per-data-set folder under the experiments root; that whole folder goes
        let folder = item.course_folder().trim();
        let Some(copy_root) = Path::new(folder)
            .parent()
            .and_then(Path::to_str)
            .filter(|parent| !is_blank(parent))
        else {
            return Err(fail(&format!(
                "The data set course folder of '{folder}' is not a descendant folder of the experiments directory."
            )));
        };

        match self.experiments.exists(copy_root).await {
            Ok(true) => self.experiments.delete(copy_root).await.map_err(|e| fail(&e))?,
            Ok(false) => tracing::warn!(
                data_collection_id = %item.id(),
                course_folder = copy_root,
                "Course copy not found, it may have been removed by an earlier delete attempt"
            ),
            Err(e) => return Err(fail(&e)),
        }
        Ok(())
    }

    /// Data sets the user holds any role on.
    pub async fn list(&self, username: &str) -> Result<Vec<DataCollection>, DataCollectionError> {
        Ok(self.repo.list_for_user(username).await?)
    }

    pub async fn get(&self, id: DataCollectionId) -> Result<DataCollection, DataCollectionError> {
        self.repo.get(id).await?.ok_or_else(|| {
            DataCollectionError::not_found(
                "Failed to find the published course.",
                format!("Failed to find the published course with id '{id}'.  Has it been deleted?"),
            )
        })
    }

    /// Renames a data set and replaces its description. Owners and managers only.
    pub async fn update(
        &self,
        username: &str,
        id: DataCollectionId,
        name: &str,
        description: Option<String>,
    ) -> Result<DataCollection, DataCollectionError> {
        let mut item = self.repo.get(id).await?.ok_or_else(|| {
            DataCollectionError::not_found(
                "An attempt was made to update the published course, but the published course could not be found in the database",
                format!("Attempted to update published course '{id}', but the published course returned from the database was null."),
            )
        })?;
        if !item.has_permission(username, OWNER_OR_MANAGER) {
            return Err(DataCollectionError::permission_denied(
                "Failed to update the published course",
                format!("The user '{username}' doesn't have permissions to update this data set with id '{id}'."),
            ));
        }

        item.update_details(EntityName::new(name)?, description);
        self.repo.save(&item).await?;
        tracing::info!(data_collection_id = %id, "Updated data set");
        Ok(item)
    }

    /// Stops collection on every running data set of a course folder that the
    /// user owns or manages. Returns how many were ended.
    pub async fn end(
        &self,
        username: &str,
        course_folder: &str,
    ) -> Result<usize, DataCollectionError> {
        let mut ended = 0;
        for mut item in self.repo.list_for_course_folder(course_folder).await? {
            if !item.has_permission(username, OWNER_OR_MANAGER) {
                tracing::debug!(data_collection_id = %item.id(), "Skipping data set the user cannot end");
                continue;
            }
            if item.end() {
                self.repo.save(&item).await?;
                ended += 1;
            }
        }
        tracing::info!(course_folder, ended, "Ended data collection for course");
        Ok(ended)
    }

    /// Whether a course folder has data sets other than the ignored types.
    ///
    /// With a username only data sets that user holds a role on count.
    pub async fn has_data_sets(
        &self,
        username: Option<&str>,
        course_folder: &str,
        ignore_types: &[DataSetType],
    ) -> Result<bool, DataCollectionError> {
        Ok(self
            .repo
            .list_for_course_folder(course_folder)
            .await?
            .iter()
            .filter(|d| !ignore_types.contains(&d.data_set_type()))
            .any(|d| username.map_or(true, |u| d.is_member(u))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::RepoError;
    use crate::use_cases::data_collection::test_support::{data_set, subject, Mocks};
    use crate::use_cases::data_collection::DetailKind;
    use gat_domain::{DataCollectionPermission, DataCollectionRole, DataCollectionStatus};

    fn request(data_set_type: DataSetType) -> CreateDataCollection {
        CreateDataCollection {
            name: "Pilot Study".into(),
            description: Some("First run".into()),
            course_folder: "alice/Pilot Course".into(),
            source_course_id: "course-1".into(),
            data_set_type,
        }
    }

    mod create {
        use super::*;

        #[tokio::test]
        async fn stores_a_new_experiment() {
            let mut mocks = Mocks::new();
            mocks.courses.expect_exists().returning(|_| Ok(true));
            mocks
                .repo
                .expect_save()
                .withf(|d| d.author() == "alice" && d.source_course_id() == Some("course-1"))
                .times(1)
                .returning(|_| Ok(()));
            let services = mocks.build();

            let item = services
                .create("alice", request(DataSetType::Experiment))
                .await
                .expect("created");
            assert_eq!(item.name(), "Pilot Study");
            assert_eq!(item.description(), Some("First run"));
            assert!(item.has_permission("alice", OWNER));
        }

        #[tokio::test]
        async fn blank_course_folder_is_invalid() {
            let services = Mocks::new().build();
            let mut req = request(DataSetType::Experiment);
            req.course_folder = "  ".into();

            let result = services.create("alice", req).await;
            assert!(matches!(result, Err(DataCollectionError::InvalidArgument(_))));
        }

        #[tokio::test]
        async fn missing_course_is_rejected() {
            let mut mocks = Mocks::new();
            mocks.courses.expect_exists().returning(|_| Ok(false));
            let services = mocks.build();

            let err = services
                .create("alice", request(DataSetType::Experiment))
                .await
                .expect_err("course missing");
            assert_eq!(err.kind(), Some(DetailKind::Rejected));
        }

        #[tokio::test]
        async fn second_course_tile_is_rejected() {
            let mut mocks = Mocks::new();
            mocks.courses.expect_exists().returning(|_| Ok(true));
            mocks
                .repo
                .expect_list_for_course_folder()
                .returning(|_| Ok(vec![data_set(DataSetType::CourseData)]));
            mocks.repo.expect_save().never();
            let services = mocks.build();

            let err = services
                .create("alice", request(DataSetType::CourseData))
                .await
                .expect_err("duplicate tile");
            assert_eq!(
                err.to_string(),
                "There is already a 'Course Tile' Published Course for the 'Pilot Study' course."
            );
        }

        #[tokio::test]
        async fn blank_source_course_fails() {
            let mut mocks = Mocks::new();
            mocks.courses.expect_exists().returning(|_| Ok(true));
            let services = mocks.build();
            let mut req = request(DataSetType::Lti);
            req.source_course_id = String::new();

            let err = services.create("alice", req).await.expect_err("no course record");
            assert_eq!(err.kind(), Some(DetailKind::Failed));
            assert_eq!(
                err.details(),
                Some("An error occurred while creating the course record for course: alice/Pilot Course")
            );
        }

        #[tokio::test]
        async fn ensure_course_tile_reuses_existing() {
            let existing = data_set(DataSetType::CourseData);
            let existing_id = existing.id();
            let mut mocks = Mocks::new();
            mocks
                .repo
                .expect_list_for_course_folder()
                .returning(move |_| Ok(vec![existing.clone()]));
            mocks.repo.expect_save().never();
            let services = mocks.build();

            let tile = services
                .ensure_course_tile("alice", "alice/Pilot Course", "Pilot", "course-1")
                .await
                .expect("tile");
            assert_eq!(tile.id(), existing_id);
        }
    }

    mod delete {
        use super::*;

        #[tokio::test]
        async fn experiment_deletes_logs_then_row() {
            let item = data_set(DataSetType::Experiment)
                .with_subject(subject(1, Some("s1.log")))
                .with_subject(subject(2, None))
                .with_subject(subject(3, Some("s3.log")));
            let id = item.id();

            let mut mocks = Mocks::new();
            mocks
                .repo
                .expect_get()
                .withf(move |got| *got == id)
                .returning(move |_| Ok(Some(item.clone())));
            mocks
                .logs
                .expect_delete()
                .times(2)
                .returning(|name| Ok(name == "s1.log"));
            mocks
                .repo
                .expect_delete()
                .withf(move |got| *got == id)
                .times(1)
                .returning(|_| Ok(true));
            mocks.experiments.expect_exists().never();
            let services = mocks.build();

            let progress = ProgressIndicator::new();
            services.delete("ALICE", id, &progress).await.expect("deleted");

            let snapshot = progress.snapshot();
            assert_eq!(snapshot.percent_complete, 100);
            assert_eq!(snapshot.task_description.as_deref(), Some(DELETING_DB_ENTRIES_TASK));
        }

        fn legacy_data_set(course_folder: &str) -> DataCollection {
            DataCollection::new(
                EntityName::new("Legacy").expect("valid name"),
                "alice",
                course_folder,
                DataSetType::Experiment,
                chrono::Utc::now(),
            )
            .expect("valid data set")
        }

        #[tokio::test]
        async fn legacy_experiment_removes_course_copy_folder() {
            let item = legacy_data_set("exp-7/Legacy Copy");
            let id = item.id();

            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks
                .experiments
                .expect_exists()
                .withf(|folder| folder == "exp-7")
                .returning(|_| Ok(true));
            mocks
                .experiments
                .expect_delete()
                .withf(|folder| folder == "exp-7")
                .times(1)
                .returning(|_| Ok(()));
            mocks.courses.expect_exists().never();
            mocks.courses.expect_delete().never();
            mocks.repo.expect_delete().times(1).returning(|_| Ok(true));
            let services = mocks.build();

            services
                .delete("alice", id, &ProgressIndicator::new())
                .await
                .expect("deleted");
        }

        #[tokio::test]
        async fn missing_course_copy_only_warns() {
            let item = legacy_data_set("exp-7/Legacy Copy");
            let id = item.id();

            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks.experiments.expect_exists().returning(|_| Ok(false));
            mocks.experiments.expect_delete().never();
            mocks.repo.expect_delete().times(1).returning(|_| Ok(true));
            let services = mocks.build();

            services
                .delete("alice", id, &ProgressIndicator::new())
                .await
                .expect("deleted");
        }

        #[tokio::test]
        async fn course_copy_without_a_parent_folder_keeps_the_row() {
            let item = legacy_data_set("Legacy Copy");
            let id = item.id();

            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks.experiments.expect_exists().never();
            mocks.experiments.expect_delete().never();
            mocks.repo.expect_delete().never();
            let services = mocks.build();

            let err = services
                .delete("alice", id, &ProgressIndicator::new())
                .await
                .expect_err("no parent folder");
            assert_eq!(err.kind(), Some(DetailKind::Failed));
            assert!(err
                .details()
                .is_some_and(|details| details.contains("not a descendant folder")));
        }

        #[tokio::test]
        async fn course_copy_delete_failure_keeps_the_row() {
            let item = legacy_data_set("exp-7/Legacy Copy");
            let id = item.id();

            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks.experiments.expect_exists().returning(|_| Ok(true));
            mocks
                .experiments
                .expect_delete()
                .returning(|_| Err(RepoError::io("course_folder_delete", "busy")));
            mocks.repo.expect_delete().never();
            let services = mocks.build();

            let err = services
                .delete("alice", id, &ProgressIndicator::new())
                .await
                .expect_err("copy delete failed");
            assert_eq!(err.to_string(), "Failed to fully delete the data set named 'Legacy'.");
        }

        #[tokio::test]
        async fn manager_cannot_delete() {
            let item = data_set(DataSetType::Lti).with_permissions(vec![
                DataCollectionPermission::new("alice", DataCollectionRole::Owner),
                DataCollectionPermission::new("bob", DataCollectionRole::Manager),
            ]);
            let id = item.id();
            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks.repo.expect_delete().never();
            let services = mocks.build();

            let err = services
                .delete("bob", id, &ProgressIndicator::new())
                .await
                .expect_err("not owner");
            assert_eq!(err.kind(), Some(DetailKind::PermissionDenied));
        }

        #[tokio::test]
        async fn unknown_id_is_not_found() {
            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(|_| Ok(None));
            let services = mocks.build();

            let err = services
                .delete("alice", DataCollectionId::new(), &ProgressIndicator::new())
                .await
                .expect_err("missing");
            assert_eq!(err.to_string(), "Failed to delete the data set.");
        }

        #[tokio::test]
        async fn log_failure_keeps_the_row() {
            let item = data_set(DataSetType::Experiment).with_subject(subject(1, Some("s1.log")));
            let id = item.id();
            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks
                .logs
                .expect_delete()
                .returning(|_| Err(RepoError::io("session_log_delete", "denied")));
            mocks.repo.expect_delete().never();
            let services = mocks.build();

            let err = services
                .delete("alice", id, &ProgressIndicator::new())
                .await
                .expect_err("log delete failed");
            assert_eq!(
                err.to_string(),
                "Failed to fully delete the data set named 'Pilot Study'."
            );
        }

        #[tokio::test]
        async fn cancelled_delete_stops_before_the_row() {
            let item = data_set(DataSetType::Experiment).with_subject(subject(1, Some("s1.log")));
            let id = item.id();
            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks.logs.expect_delete().never();
            mocks.repo.expect_delete().never();
            let services = mocks.build();

            let progress = ProgressIndicator::new();
            progress.cancel();
            let result = services.delete("alice", id, &progress).await;
            assert!(matches!(result, Err(DataCollectionError::Cancelled)));
        }
    }

    mod update_and_end {
        use super::*;

        #[tokio::test]
        async fn manager_can_rename() {
            let item = data_set(DataSetType::Experiment).with_permissions(vec![
                DataCollectionPermission::new("alice", DataCollectionRole::Owner),
                DataCollectionPermission::new("bob", DataCollectionRole::Manager),
            ]);
            let id = item.id();
            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks
                .repo
                .expect_save()
                .withf(|d| d.name() == "Renamed" && d.description().is_none())
                .times(1)
                .returning(|_| Ok(()));
            let services = mocks.build();

            let updated = services
                .update("bob", id, "Renamed", Some("   ".into()))
                .await
                .expect("updated");
            assert_eq!(updated.name(), "Renamed");
        }

        #[tokio::test]
        async fn researcher_cannot_rename() {
            let item = data_set(DataSetType::Experiment).with_permissions(vec![
                DataCollectionPermission::new("carol", DataCollectionRole::Researcher),
            ]);
            let id = item.id();
            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(move |_| Ok(Some(item.clone())));
            mocks.repo.expect_save().never();
            let services = mocks.build();

            let err = services
                .update("carol", id, "Renamed", None)
                .await
                .expect_err("researcher");
            assert_eq!(err.kind(), Some(DetailKind::PermissionDenied));
        }

        #[tokio::test]
        async fn end_saves_only_running_items() {
            let running = data_set(DataSetType::Experiment);
            let mut already = data_set(DataSetType::Lti);
            already.end();

            let mut mocks = Mocks::new();
            mocks
                .repo
                .expect_list_for_course_folder()
                .withf(|folder| folder == "alice/Pilot Course")
                .returning(move |_| Ok(vec![running.clone(), already.clone()]));
            mocks
                .repo
                .expect_save()
                .withf(|d| d.status() == DataCollectionStatus::Ended)
                .times(1)
                .returning(|_| Ok(()));
            let services = mocks.build();

            let ended = services
                .end("alice", "alice/Pilot Course")
                .await
                .expect("ended");
            assert_eq!(ended, 1);
        }

        #[tokio::test]
        async fn get_reports_a_missing_course() {
            let mut mocks = Mocks::new();
            mocks.repo.expect_get().returning(|_| Ok(None));
            let services = mocks.build();

            let err = services.get(DataCollectionId::new()).await.expect_err("missing");
            assert_eq!(err.to_string(), "Failed to find the published course.");
            assert_eq!(err.kind(), Some(DetailKind::NotFound));
        }
    }

    mod queries {
        use super::*;

        #[tokio::test]
        async fn has_data_sets_honours_ignored_types() {
            let mut mocks = Mocks::new();
            mocks
                .repo
                .expect_list_for_course_folder()
                .returning(|_| Ok(vec![data_set(DataSetType::CourseData)]));
            let services = mocks.build();

            assert!(services
                .has_data_sets(None, "alice/Pilot Course", &[])
                .await
                .expect("query"));
            assert!(!services
                .has_data_sets(None, "alice/Pilot Course", &[DataSetType::CourseData])
                .await
                .expect("query"));
            assert!(!services
                .has_data_sets(Some("mallory"), "alice/Pilot Course", &[])
                .await
                .expect("query"));
        }
    }
}
