//! SQLite-backed data collection storage.
//!
//! Each data set is stored as one JSON document keyed by id; the course folder
//! is kept in its own column so per-course lookups stay in SQL.

use async_trait::async_trait;
use gat_domain::{DataCollection, DataCollectionId};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, DataCollectionRepo, RepoError};

/// SQLite implementation of [`DataCollectionRepo`].
pub struct SqliteDataCollectionRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteDataCollectionRepo {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("data_collection", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS data_collections (
                id TEXT PRIMARY KEY NOT NULL,
                course_folder TEXT NOT NULL,
                published_at TEXT NOT NULL,
                data_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("data_collection", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_data_collections_course_folder ON data_collections (course_folder)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("data_collection", e))?;

        Ok(Self { pool, clock })
    }

    fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<DataCollection, RepoError> {
        let json: String = row.get("data_json");
        serde_json::from_str(&json).map_err(|e| RepoError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl DataCollectionRepo for SqliteDataCollectionRepo {
    async fn get(&self, id: DataCollectionId) -> Result<Option<DataCollection>, RepoError> {
        let row = sqlx::query("SELECT data_json FROM data_collections WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("data_collection_get", e))?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list_for_user(&self, username: &str) -> Result<Vec<DataCollection>, RepoError> {
        let rows = sqlx::query("SELECT data_json FROM data_collections ORDER BY published_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("data_collection_list", e))?;

        // Permissions live inside the JSON document
        let mut items = Vec::new();
        for row in &rows {
            let item = Self::decode(row)?;
            if item.is_member(username) {
                items.push(item);
            }
        }
        Ok(items)
    }

    async fn list_for_course_folder(
        &self,
        course_folder: &str,
    ) -> Result<Vec<DataCollection>, RepoError> {
        let rows = sqlx::query(
            "SELECT data_json FROM data_collections WHERE course_folder = ? ORDER BY published_at",
        )
        .bind(course_folder)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("data_collection_list_for_course", e))?;

        rows.iter().map(Self::decode).collect()
    }

    async fn save(&self, item: &DataCollection) -> Result<(), RepoError> {
        let json =
            serde_json::to_string(item).map_err(|e| RepoError::Serialization(e.to_string()))?;
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO data_collections (id, course_folder, published_at, data_json, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                course_folder = excluded.course_folder,
                published_at = excluded.published_at,
                data_json = excluded.data_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(item.id().to_string())
        .bind(item.course_folder())
        .bind(item.published_date().to_rfc3339())
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("data_collection_save", e))?;

        Ok(())
    }

    async fn delete(&self, id: DataCollectionId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM data_collections WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("data_collection_delete", e))?;
        Ok(result.rows_affected() > 0)
    }
}
