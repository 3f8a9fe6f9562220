mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::users::models::{NewUser, OrgRole, User};

pub use postgres::PgUserRepository;

/// Persistence for users and their organization memberships
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_token(&self, token_identifier: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Insert a user unless one with the same token exists. Name and image
    /// only seed a new row; an existing user is returned unchanged.
    async fn get_or_create(&self, new_user: NewUser) -> Result<User>;

    /// Insert a user or overwrite the name and image of the existing one
    async fn upsert(&self, new_user: NewUser) -> Result<User>;

    /// Add a membership, appended after existing ones. Re-adding an existing
    /// organization leaves it untouched and returns `false`.
    async fn add_membership(&self, user_id: Uuid, org_id: &str, role: OrgRole) -> Result<bool>;

    /// Change the role of an existing membership. Returns `false` if the user
    /// is not a member of the organization.
    async fn update_membership_role(
        &self,
        user_id: Uuid,
        org_id: &str,
        role: OrgRole,
    ) -> Result<bool>;
}
