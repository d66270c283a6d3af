//! Local disk implementations of the participant log and course folder stores.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use crate::infrastructure::ports::{CourseFolderStore, RepoError, SessionLogStore};

/// Joins a caller-supplied relative path onto `root`, refusing anything that
/// could land outside it.
pub(crate) fn join_inside(root: &Path, relative: &str) -> Result<PathBuf, RepoError> {
    let relative = Path::new(relative.trim());
    let escapes = relative.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || relative.as_os_str().is_empty() {
        return Err(RepoError::constraint(format!(
            "'{}' is not a path inside {}",
            relative.display(),
            root.display()
        )));
    }
    Ok(root.join(relative))
}

/// Size of a file, or the sum of every file below a directory.
fn size_on_disk(path: &Path) -> std::io::Result<u64> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }
    let mut total = 0;
    for entry in std::fs::read_dir(path)? {
        total += size_on_disk(&entry?.path())?;
    }
    Ok(total)
}

async fn blocking_size(operation: &'static str, path: PathBuf) -> Result<u64, RepoError> {
    tokio::task::spawn_blocking(move || size_on_disk(&path))
        .await
        .map_err(|e| RepoError::io(operation, e))?
        .map_err(|e| RepoError::io(operation, e))
}

// =============================================================================
// Session logs
// =============================================================================

/// Session logs stored under the domain session log directory.
pub struct FsSessionLogStore {
    root: PathBuf,
}

impl FsSessionLogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SessionLogStore for FsSessionLogStore {
    async fn resolve(&self, filename: &str) -> Result<Option<PathBuf>, RepoError> {
        let path = join_inside(&self.root, filename)?;
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| RepoError::io("session_log_resolve", e))?;
        Ok(exists.then_some(path))
    }

    async fn delete(&self, filename: &str) -> Result<bool, RepoError> {
        let path = join_inside(&self.root, filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RepoError::io("session_log_delete", e)),
        }
    }

    async fn size_bytes(&self, path: &Path) -> Result<u64, RepoError> {
        blocking_size("session_log_size", path.to_path_buf()).await
    }
}

// =============================================================================
// Course folders
// =============================================================================

/// Course folders under the workspace directory.
pub struct FsCourseFolderStore {
    workspace: PathBuf,
}

impl FsCourseFolderStore {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    async fn existing_dir(&self, course_folder: &str) -> Result<PathBuf, RepoError> {
        let path = join_inside(&self.workspace, course_folder)?;
        match tokio::fs::metadata(&path).await {
            Ok(m) if m.is_dir() => Ok(path),
            Ok(_) => Err(RepoError::constraint(format!(
                "'{}' is not a directory",
                course_folder
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RepoError::not_found("CourseFolder", course_folder))
            }
            Err(e) => Err(RepoError::io("course_folder_resolve", e)),
        }
    }
}

#[async_trait]
impl CourseFolderStore for FsCourseFolderStore {
    async fn exists(&self, course_folder: &str) -> Result<bool, RepoError> {
        match self.existing_dir(course_folder).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, course_folder: &str) -> Result<(), RepoError> {
        let path = self.existing_dir(course_folder).await?;
        tokio::fs::remove_dir_all(&path)
            .await
            .map_err(|e| RepoError::io("course_folder_delete", e))
    }

    async fn size_bytes(&self, course_folder: &str) -> Result<u64, RepoError> {
        let path = self.existing_dir(course_folder).await?;
        blocking_size("course_folder_size", path).await
    }

    async fn resolve(&self, course_folder: &str) -> Result<PathBuf, RepoError> {
        self.existing_dir(course_folder).await
    }
}
