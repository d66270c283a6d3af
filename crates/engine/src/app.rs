//! Application state and composition.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::infrastructure::{
    clock::SystemClock,
    data_collections::SqliteDataCollectionRepo,
    downloads::{DirectoryArchiveWriter, ManifestReportWriter},
    file_stores::{FsCourseFolderStore, FsSessionLogStore},
    ports::{
        ArchiveWriter, ClockPort, CourseFolderStore, DataCollectionRepo, RepoError, ReportWriter,
        SessionLogStore,
    },
};
use crate::use_cases::data_collection::{DataCollectionServices, DataCollectionSettings};

/// Main application state.
///
/// Holds all repository modules and use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
pub struct Repositories {
    pub data_collection: Arc<dyn DataCollectionRepo>,
    pub session_logs: Arc<dyn SessionLogStore>,
    pub course_folders: Arc<dyn CourseFolderStore>,
    /// Course copies of legacy data sets
    pub experiment_folders: Arc<dyn CourseFolderStore>,
}

/// Container for all use cases.
pub struct UseCases {
    pub data_collection: Arc<DataCollectionServices>,
}

impl App {
    /// Wires the use cases over already-constructed ports.
    pub fn new(
        repositories: Repositories,
        archives: Arc<dyn ArchiveWriter>,
        reports: Arc<dyn ReportWriter>,
        clock: Arc<dyn ClockPort>,
        settings: DataCollectionSettings,
    ) -> Self {
        let data_collection = Arc::new(DataCollectionServices::new(
            repositories.data_collection.clone(),
            repositories.session_logs.clone(),
            repositories.course_folders.clone(),
            repositories.experiment_folders.clone(),
            archives,
            reports,
            clock,
            settings,
        ));

        Self {
            repositories,
            use_cases: UseCases { data_collection },
        }
    }

    /// Builds the application over SQLite and the local file system.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, RepoError> {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let repo = SqliteDataCollectionRepo::new(&config.database_path, clock.clone()).await?;

        let repositories = Repositories {
            data_collection: Arc::new(repo),
            session_logs: Arc::new(FsSessionLogStore::new(&config.session_log_dir)),
            course_folders: Arc::new(FsCourseFolderStore::new(&config.workspace_dir)),
            experiment_folders: Arc::new(FsCourseFolderStore::new(&config.experiment_dir)),
        };

        Ok(Self::new(
            repositories,
            Arc::new(DirectoryArchiveWriter::new(&config.export_dir)),
            Arc::new(ManifestReportWriter::new(&config.export_dir)),
            clock,
            config.data_collection.clone(),
        ))
    }
}
