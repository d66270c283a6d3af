//! Data collection services: the lifecycle of published courses that record
//! participant data, and the exports and reports built from that data.
//!
//! Every operation reports through a [`ProgressIndicator`] when it touches
//! participant files, and returns [`DataCollectionError::Detailed`] with a
//! user-facing reason when a request cannot be honoured.

mod error;
mod export;
mod lifecycle;
mod progress;
mod report;

use std::str::FromStr;
use std::sync::Arc;

use gat_domain::{DataCollection, DataCollectionId, DataCollectionRole};

use crate::infrastructure::ports::{
    ArchiveWriter, ClockPort, CourseFolderStore, DataCollectionRepo, ReportWriter,
    SessionLogStore,
};

pub use error::{DataCollectionError, DetailKind};
pub use lifecycle::CreateDataCollection;
pub use progress::{ProgressIndicator, ProgressSnapshot};

// =============================================================================
// Progress milestones
// =============================================================================

/// Progress once participant logs have been located.
pub const GATHERED_EXPERIMENT_DATA: u32 = 25;
/// Progress once report columns have been collected.
pub const GATHERED_COLUMN_DATA: u32 = GATHERED_EXPERIMENT_DATA + (100 - GATHERED_EXPERIMENT_DATA) / 2;
pub const REPORT_CREATED: u32 = 100;
pub const SUBJECT_DATA_DELETED: u32 = 50;
pub const EXPERIMENT_COURSE_DELETED: u32 = 40;
pub const TOTAL_PROGRESS: u32 = 100;

// =============================================================================
// Task descriptions
// =============================================================================

pub const GATHERING_DATA_TASK: &str = "Gathering data";
pub const DELETING_PARTICIPANT_DATA_TASK: &str = "Deleting participant data";
pub const DELETING_COURSE_COPY_TASK: &str = "Deleting copy of course";
pub const DELETING_DB_ENTRIES_TASK: &str = "Deleting database entries";
pub const ZIPPING_DATA_TASK: &str = "Zipping data";
pub const BUILDING_DOWNLOAD_URL_TASK: &str = "Building download URL";
pub const STARTING_REPORT_GENERATION_TASK: &str = "Starting event report generation";
pub const DETERMINE_PARTICIPANT_DATA_SIZE_TASK: &str = "Determing total participant data file size";
pub const INIT_GENERATE_REPORT_TASK: &str = "Initializing report generation";

const NO_PARTICIPANTS: &str =
    "No participants have started the course yet, therefore there is no data to export.";

const OWNER: &[DataCollectionRole] = &[DataCollectionRole::Owner];
const OWNER_OR_MANAGER: &[DataCollectionRole] =
    &[DataCollectionRole::Owner, DataCollectionRole::Manager];

const BYTES_PER_MB: u64 = 1024 * 1024;

pub(crate) fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB as f64
}

pub(crate) fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(BYTES_PER_MB)
}

// =============================================================================
// Settings
// =============================================================================

/// Whether the engine runs for a single local author or as a shared server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    #[default]
    Desktop,
    Server,
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "server" => Ok(Self::Server),
            other => Err(format!("unknown deployment mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataCollectionSettings {
    pub deployment_mode: DeploymentMode,
    /// Reports refuse larger participant data sets in server mode
    pub max_participant_data_size_mb: u64,
}

impl Default for DataCollectionSettings {
    fn default() -> Self {
        Self {
            deployment_mode: DeploymentMode::Desktop,
            max_participant_data_size_mb: 1024,
        }
    }
}

// =============================================================================
// Services
// =============================================================================

pub struct DataCollectionServices {
    repo: Arc<dyn DataCollectionRepo>,
    logs: Arc<dyn SessionLogStore>,
    /// Authored course folders in the workspace
    courses: Arc<dyn CourseFolderStore>,
    /// Private course copies owned by legacy data sets
    experiments: Arc<dyn CourseFolderStore>,
    archives: Arc<dyn ArchiveWriter>,
    reports: Arc<dyn ReportWriter>,
    clock: Arc<dyn ClockPort>,
    settings: DataCollectionSettings,
}

impl DataCollectionServices {
    pub fn new(
        repo: Arc<dyn DataCollectionRepo>,
        logs: Arc<dyn SessionLogStore>,
        courses: Arc<dyn CourseFolderStore>,
        experiments: Arc<dyn CourseFolderStore>,
        archives: Arc<dyn ArchiveWriter>,
        reports: Arc<dyn ReportWriter>,
        clock: Arc<dyn ClockPort>,
        settings: DataCollectionSettings,
    ) -> Self {
        Self {
            repo,
            logs,
            courses,
            experiments,
            archives,
            reports,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &DataCollectionSettings {
        &self.settings
    }

    /// Loads a data set or fails with `reason` and the standard "not found" details.
    async fn require(
        &self,
        id: DataCollectionId,
        reason: &str,
    ) -> Result<DataCollection, DataCollectionError> {
        self.repo.get(id).await?.ok_or_else(|| {
            DataCollectionError::not_found(
                reason,
                format!("Failed to find the data set with id '{id}'."),
            )
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared builders for the service tests.

    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use gat_domain::{DataCollection, DataSetType, EntityName, LtiResult, Subject};

    use super::{DataCollectionServices, DataCollectionSettings};
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        MockArchiveWriter, MockCourseFolderStore, MockDataCollectionRepo, MockReportWriter,
        MockSessionLogStore,
    };

    pub(crate) struct Mocks {
        pub repo: MockDataCollectionRepo,
        pub logs: MockSessionLogStore,
        pub courses: MockCourseFolderStore,
        pub experiments: MockCourseFolderStore,
        pub archives: MockArchiveWriter,
        pub reports: MockReportWriter,
        pub settings: DataCollectionSettings,
    }

    impl Mocks {
        pub(crate) fn new() -> Self {
            Self {
                repo: MockDataCollectionRepo::new(),
                logs: MockSessionLogStore::new(),
                courses: MockCourseFolderStore::new(),
                experiments: MockCourseFolderStore::new(),
                archives: MockArchiveWriter::new(),
                reports: MockReportWriter::new(),
                settings: DataCollectionSettings::default(),
            }
        }

        pub(crate) fn build(self) -> DataCollectionServices {
            let now = Utc
                .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
                .single()
                .expect("valid timestamp");
            DataCollectionServices::new(
                Arc::new(self.repo),
                Arc::new(self.logs),
                Arc::new(self.courses),
                Arc::new(self.experiments),
                Arc::new(self.archives),
                Arc::new(self.reports),
                Arc::new(FixedClock(now)),
                self.settings,
            )
        }
    }

    pub(crate) fn data_set(data_set_type: DataSetType) -> DataCollection {
        let published = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        DataCollection::new(
            EntityName::new("Pilot Study").expect("valid name"),
            "alice",
            "alice/Pilot Course",
            data_set_type,
            published,
        )
        .expect("valid data set")
        .with_source_course_id("course-1")
    }

    pub(crate) fn subject(id: u32, log: Option<&str>) -> Subject {
        Subject {
            subject_id: id,
            message_log_filename: log.map(str::to_string),
            start_time: None,
        }
    }

    pub(crate) fn lti_result(consumer: &str, log: Option<&str>) -> LtiResult {
        LtiResult {
            consumer_id: consumer.to_string(),
            message_log_filename: log.map(str::to_string),
        }
    }
}
