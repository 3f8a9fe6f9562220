use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::FileRepository;
use crate::core::error::{AppError, Result};
use crate::features::files::models::{File, NewFile, PurgeOutcome};
use crate::modules::storage::BlobStore;

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn insert(&self, new_file: NewFile) -> Result<File> {
        sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (id, org_id, user_id, name, file_type, blob_handle)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, org_id, user_id, name, file_type, blob_handle, should_delete, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&new_file.org_id)
        .bind(new_file.user_id)
        .bind(&new_file.name)
        .bind(new_file.file_type)
        .bind(&new_file.blob_handle)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Each blob belongs to at most one file
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                tracing::debug!("Blob handle {} already registered", new_file.blob_handle);
                AppError::access_denied()
            }
            e => {
                tracing::error!("Failed to insert file: {:?}", e);
                AppError::Database(e)
            }
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(
            r#"
            SELECT id, org_id, user_id, name, file_type, blob_handle, should_delete, created_at
            FROM files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn set_should_delete(&self, id: Uuid, should_delete: bool) -> Result<bool> {
        // Waits on a purge holding the row lock; sees no row once it commits
        let result = sqlx::query("UPDATE files SET should_delete = $2 WHERE id = $1")
            .bind(id)
            .bind(should_delete)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update deletion mark of file {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_org(&self, org_id: &str) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(
            r#"
            SELECT id, org_id, user_id, name, file_type, blob_handle, should_delete, created_at
            FROM files
            WHERE org_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list files of org {}: {:?}", org_id, e);
            AppError::Database(e)
        })?;

        Ok(files)
    }

    async fn list_marked(&self, limit: i64) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM files
            WHERE should_delete = TRUE
            ORDER BY created_at, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn purge_marked(&self, id: Uuid, blobs: &dyn BlobStore) -> Result<PurgeOutcome> {
        let mut tx = self.pool.begin().await?;

        let handle = sqlx::query_scalar::<_, String>(
            r#"
            SELECT blob_handle
            FROM files
            WHERE id = $1 AND should_delete = TRUE
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(handle) = handle else {
            tx.rollback().await?;
            return Ok(PurgeOutcome::Skipped);
        };

        // A failure here rolls back and leaves the row marked for the next sweep
        blobs.delete(&handle).await?;

        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PurgeOutcome::Purged)
    }
}
