use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::FavoriteRepository;
use crate::core::error::{AppError, Result};
use crate::features::favorites::models::Favorite;

pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn lock_key(user_id: Uuid, org_id: &str, file_id: Uuid) -> String {
        format!("favorite:{}:{}:{}", user_id, org_id, file_id)
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn toggle(&self, user_id: Uuid, org_id: &str, file_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Serializes toggles of this triple until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(Self::lock_key(user_id, org_id, file_id))
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND org_id = $2 AND file_id = $3
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .bind(file_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                r#"
                INSERT INTO favorites (user_id, org_id, file_id)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user_id)
            .bind(org_id)
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert favorite for file {}: {:?}", file_id, e);
                AppError::Database(e)
            })?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    async fn list_for_user(&self, user_id: Uuid, org_id: &str) -> Result<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT user_id, org_id, file_id, created_at
            FROM favorites
            WHERE user_id = $1 AND org_id = $2
            ORDER BY created_at, file_id
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(favorites)
    }
}
