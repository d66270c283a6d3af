//! Repository port traits.

use async_trait::async_trait;
use gat_domain::{DataCollection, DataCollectionId};

use super::RepoError;

// =============================================================================
// Data Collection
// =============================================================================

/// Persistence for published data sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataCollectionRepo: Send + Sync {
    async fn get(&self, id: DataCollectionId) -> Result<Option<DataCollection>, RepoError>;

    /// Data sets the user holds any permission on.
    async fn list_for_user(&self, username: &str) -> Result<Vec<DataCollection>, RepoError>;

    /// Every data set collecting on the given workspace course folder.
    async fn list_for_course_folder(
        &self,
        course_folder: &str,
    ) -> Result<Vec<DataCollection>, RepoError>;

    /// Insert or replace.
    async fn save(&self, item: &DataCollection) -> Result<(), RepoError>;

    /// Returns false if nothing was stored under `id`.
    async fn delete(&self, id: DataCollectionId) -> Result<bool, RepoError>;
}
