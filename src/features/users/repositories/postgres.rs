use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::UserRepository;
use crate::core::error::{AppError, Result};
use crate::features::users::models::{Membership, NewUser, OrgRole, User};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_memberships(&self, user: Option<User>) -> Result<Option<User>> {
        let Some(mut user) = user else {
            return Ok(None);
        };

        user.memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT org_id, role
            FROM user_memberships
            WHERE user_id = $1
            ORDER BY created_at, org_id
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load memberships for user {}: {:?}", user.id, e);
            AppError::Database(e)
        })?;

        Ok(Some(user))
    }

    async fn write_user(&self, sql: &str, new_user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(sql)
            .bind(Uuid::now_v7())
            .bind(&new_user.token_identifier)
            .bind(&new_user.name)
            .bind(&new_user.image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to write user: {:?}", e);
                AppError::Database(e)
            })?;

        self.with_memberships(Some(user))
            .await?
            .ok_or_else(|| AppError::Internal("User vanished after write".to_string()))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_token(&self, token_identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token_identifier, name, image_url, created_at
            FROM users
            WHERE token_identifier = $1
            "#,
        )
        .bind(token_identifier)
        .fetch_optional(&self.pool)
        .await?;

        self.with_memberships(user).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token_identifier, name, image_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_memberships(user).await
    }

    async fn get_or_create(&self, new_user: NewUser) -> Result<User> {
        // The no-op update makes RETURNING yield the existing row on conflict
        self.write_user(
            r#"
            INSERT INTO users (id, token_identifier, name, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_identifier)
            DO UPDATE SET token_identifier = EXCLUDED.token_identifier
            RETURNING id, token_identifier, name, image_url, created_at
            "#,
            new_user,
        )
        .await
    }

    async fn upsert(&self, new_user: NewUser) -> Result<User> {
        self.write_user(
            r#"
            INSERT INTO users (id, token_identifier, name, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_identifier)
            DO UPDATE SET name = EXCLUDED.name, image_url = EXCLUDED.image_url, updated_at = NOW()
            RETURNING id, token_identifier, name, image_url, created_at
            "#,
            new_user,
        )
        .await
    }

    async fn add_membership(&self, user_id: Uuid, org_id: &str, role: OrgRole) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_memberships (user_id, org_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, org_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_membership_role(
        &self,
        user_id: Uuid,
        org_id: &str,
        role: OrgRole,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_memberships
            SET role = $3
            WHERE user_id = $1 AND org_id = $2
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
