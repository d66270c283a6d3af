//! Data collection aggregate - a published course that records participant data
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: status and permissions only change through methods
//! - **Newtypes**: the display name is an `EntityName`
//! - **Builder pattern**: fluent `with_*` methods for optional parts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{is_blank, EntityName};
use crate::DataCollectionId;

/// Where participant data for a data set comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSetType {
    /// A unique URL handed out to participants
    Experiment,
    /// Launched from an LTI consumer
    Lti,
    /// Anyone taking the course from its course tile
    CourseData,
}

impl fmt::Display for DataSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Experiment => write!(f, "Experiment"),
            Self::Lti => write!(f, "LTI"),
            Self::CourseData => write!(f, "Course Tile"),
        }
    }
}

impl FromStr for DataSetType {
    type Err = DomainError;

    /// Accepts the serialized names (`EXPERIMENT`, `LTI`, `COURSE_DATA`) in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXPERIMENT" => Ok(Self::Experiment),
            "LTI" => Ok(Self::Lti),
            "COURSE_DATA" => Ok(Self::CourseData),
            other => Err(DomainError::parse(format!("unknown data set type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataCollectionStatus {
    #[default]
    Running,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataCollectionRole {
    Owner,
    Manager,
    Researcher,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCollectionPermission {
    pub username: String,
    pub role: DataCollectionRole,
}

impl DataCollectionPermission {
    pub fn new(username: impl Into<String>, role: DataCollectionRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

/// A participant who started an experiment or course-tile data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub subject_id: u32,
    /// Session log, relative to the domain session log directory
    pub message_log_filename: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
}

/// A participant launched through an LTI consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LtiResult {
    pub consumer_id: String,
    pub message_log_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCollection {
    id: DataCollectionId,
    name: EntityName,
    description: Option<String>,
    author: String,
    /// Workspace-relative folder of the course being collected on
    course_folder: String,
    /// Blank for legacy data sets that own a private copy of the course
    source_course_id: Option<String>,
    data_set_type: DataSetType,
    status: DataCollectionStatus,
    published_date: DateTime<Utc>,
    permissions: Vec<DataCollectionPermission>,
    subjects: Vec<Subject>,
    lti_results: Vec<LtiResult>,
}

impl DataCollection {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a running data set. The author becomes its owner.
    pub fn new(
        name: EntityName,
        author: impl Into<String>,
        course_folder: impl Into<String>,
        data_set_type: DataSetType,
        published_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let author = author.into();
        let course_folder = course_folder.into();
        if is_blank(&author) {
            return Err(DomainError::validation("A data set needs an author"));
        }
        if is_blank(&course_folder) {
            return Err(DomainError::validation("The course folder cannot be blank"));
        }

        Ok(Self {
            id: DataCollectionId::new(),
            name,
            description: None,
            permissions: vec![DataCollectionPermission::new(
                author.clone(),
                DataCollectionRole::Owner,
            )],
            author,
            course_folder,
            source_course_id: None,
            data_set_type,
            status: DataCollectionStatus::Running,
            published_date,
            subjects: Vec::new(),
            lti_results: Vec::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> DataCollectionId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[inline]
    pub fn course_folder(&self) -> &str {
        &self.course_folder
    }

    #[inline]
    pub fn source_course_id(&self) -> Option<&str> {
        self.source_course_id.as_deref()
    }

    #[inline]
    pub fn data_set_type(&self) -> DataSetType {
        self.data_set_type
    }

    #[inline]
    pub fn status(&self) -> DataCollectionStatus {
        self.status
    }

    #[inline]
    pub fn published_date(&self) -> DateTime<Utc> {
        self.published_date
    }

    #[inline]
    pub fn permissions(&self) -> &[DataCollectionPermission] {
        &self.permissions
    }

    #[inline]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[inline]
    pub fn lti_results(&self) -> &[LtiResult] {
        &self.lti_results
    }

    /// Legacy data sets predate source course ids and own a copy of the course.
    pub fn is_legacy(&self) -> bool {
        self.source_course_id.as_deref().map_or(true, is_blank)
    }

    /// Session log filenames of every participant, by data set type.
    ///
    /// Participants without a log are included as `None`.
    pub fn participant_logs(&self) -> Vec<Option<&str>> {
        match self.data_set_type {
            DataSetType::Experiment | DataSetType::CourseData => self
                .subjects
                .iter()
                .map(|s| s.message_log_filename.as_deref())
                .collect(),
            DataSetType::Lti => self
                .lti_results
                .iter()
                .map(|r| r.message_log_filename.as_deref())
                .collect(),
        }
    }

    // =========================================================================
    // Permissions
    // =========================================================================

    /// True if `username` holds one of `roles`. Usernames compare case-insensitively.
    ///
    /// A data set without any permission entries predates permissions; its
    /// author is treated as the owner.
    pub fn has_permission(&self, username: &str, roles: &[DataCollectionRole]) -> bool {
        if is_blank(username) {
            return false;
        }
        if self.permissions.is_empty() {
            return roles.contains(&DataCollectionRole::Owner)
                && self.author.eq_ignore_ascii_case(username);
        }
        self.permissions
            .iter()
            .any(|p| p.username.eq_ignore_ascii_case(username) && roles.contains(&p.role))
    }

    /// True if `username` holds any role. Without permission entries only the author does.
    pub fn is_member(&self, username: &str) -> bool {
        if is_blank(username) {
            return false;
        }
        if self.permissions.is_empty() {
            return self.author.eq_ignore_ascii_case(username);
        }
        self.permissions
            .iter()
            .any(|p| p.username.eq_ignore_ascii_case(username))
    }

    /// Every role may run reports.
    #[inline]
    pub fn can_run_reports(&self, username: &str) -> bool {
        self.is_member(username)
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: DataCollectionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source_course_id(mut self, course_id: impl Into<String>) -> Self {
        self.source_course_id = Some(course_id.into());
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<DataCollectionPermission>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    pub fn with_lti_result(mut self, result: LtiResult) -> Self {
        self.lti_results.push(result);
        self
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    pub fn update_details(&mut self, name: EntityName, description: Option<String>) {
        self.name = name;
        self.description = description.filter(|d| !is_blank(d));
    }

    /// Stop collecting. Returns false if the data set had already ended.
    pub fn end(&mut self) -> bool {
        if self.status == DataCollectionStatus::Ended {
            return false;
        }
        self.status = DataCollectionStatus::Ended;
        true
    }

    pub fn set_status(&mut self, status: DataCollectionStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn data_set_type_parses_serialized_names() {
        assert_eq!("course_data".parse::<DataSetType>(), Ok(DataSetType::CourseData));
        assert_eq!(" LTI ".parse::<DataSetType>(), Ok(DataSetType::Lti));
        assert!("tile".parse::<DataSetType>().is_err());
    }

    fn create_test_data_collection(data_set_type: DataSetType) -> DataCollection {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid date");
        DataCollection::new(
            EntityName::new("Route Study").expect("valid name"),
            "Alice",
            "Alice/Route Clearance",
            data_set_type,
            published,
        )
        .expect("valid data set")
    }

    mod constructor {
        use super::*;

        #[test]
        fn author_is_owner() {
            let dc = create_test_data_collection(DataSetType::Experiment);
            assert_eq!(dc.status(), DataCollectionStatus::Running);
            assert_eq!(
                dc.permissions(),
                &[DataCollectionPermission::new("Alice", DataCollectionRole::Owner)]
            );
            assert!(dc.is_legacy());
        }

        #[test]
        fn blank_course_folder_is_rejected() {
            let result = DataCollection::new(
                EntityName::new("Study").expect("valid name"),
                "Alice",
                "  ",
                DataSetType::Experiment,
                Utc::now(),
            );
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }
    }

    mod permissions {
        use super::*;

        #[test]
        fn usernames_compare_case_insensitively() {
            let dc = create_test_data_collection(DataSetType::Experiment).with_permissions(vec![
                DataCollectionPermission::new("Alice", DataCollectionRole::Owner),
                DataCollectionPermission::new("bob", DataCollectionRole::Researcher),
            ]);

            assert!(dc.has_permission("ALICE", &[DataCollectionRole::Owner]));
            assert!(!dc.has_permission("Bob", &[DataCollectionRole::Owner, DataCollectionRole::Manager]));
            assert!(dc.can_run_reports("BOB"));
            assert!(!dc.can_run_reports("carol"));
        }

        #[test]
        fn legacy_data_set_falls_back_to_author() {
            let dc = create_test_data_collection(DataSetType::Lti).with_permissions(Vec::new());
            assert!(dc.can_run_reports("alice"));
            assert!(dc.has_permission("alice", &[DataCollectionRole::Owner]));
            assert!(!dc.has_permission("alice", &[DataCollectionRole::Manager]));
            assert!(!dc.can_run_reports("bob"));
        }
    }

    mod participants {
        use super::*;

        #[test]
        fn logs_follow_data_set_type() {
            let subject = Subject {
                subject_id: 1,
                message_log_filename: Some("s1/log.bin".into()),
                start_time: None,
            };
            let lti = LtiResult {
                consumer_id: "c1".into(),
                message_log_filename: None,
            };

            let experiment = create_test_data_collection(DataSetType::Experiment)
                .with_subject(subject.clone())
                .with_lti_result(lti.clone());
            assert_eq!(experiment.participant_logs(), vec![Some("s1/log.bin")]);

            let lti_set = create_test_data_collection(DataSetType::Lti)
                .with_subject(subject)
                .with_lti_result(lti);
            assert_eq!(lti_set.participant_logs(), vec![None]);
        }
    }

    #[test]
    fn end_is_idempotent() {
        let mut dc = create_test_data_collection(DataSetType::CourseData);
        assert!(dc.end());
        assert!(!dc.end());
        assert_eq!(dc.status(), DataCollectionStatus::Ended);
    }
}
