use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::access;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{MeResponseDto, UserProfileDto};
use crate::features::users::models::{NewUser, OrgRole, User};
use crate::features::users::repositories::UserRepository;

/// Maps authenticated identities onto user records
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Find the caller's user record, creating it on first sight.
    ///
    /// Makes no access decision. Fails only when the registry is unreachable.
    pub async fn resolve(&self, identity: &AuthenticatedUser) -> Result<User> {
        if let Some(user) = self.users.find_by_token(&identity.token_identifier).await? {
            tracing::debug!("Resolved user {} for {}", user.id, identity.token_identifier);
            return Ok(user);
        }

        let user = self
            .users
            .get_or_create(NewUser {
                token_identifier: identity.token_identifier.clone(),
                name: identity.name.clone(),
                image_url: identity.picture.clone(),
            })
            .await?;

        tracing::info!("Created user {} for {}", user.id, identity.token_identifier);
        Ok(user)
    }

    /// Authorize a read of `org_id` (default: the caller's active
    /// organization). Returns the caller and the effective organization, or
    /// `None` when the caller is anonymous, cannot be resolved, or has no
    /// access. Reads turn `None` into an empty result.
    pub async fn authorize_read(
        &self,
        identity: Option<&AuthenticatedUser>,
        org_id: Option<&str>,
    ) -> Option<(User, String)> {
        let identity = identity?;
        let org_id = org_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| identity.default_org_id())
            .to_string();

        let user = match self.resolve(identity).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(
                    transient = e.is_transient(),
                    "Identity resolution failed on read: {}",
                    e
                );
                return None;
            }
        };

        if !access::has_access_to_org(&user, &org_id) {
            tracing::debug!("User {} has no access to org {}", user.id, org_id);
            return None;
        }

        Some((user, org_id))
    }

    pub async fn me(&self, identity: &AuthenticatedUser) -> Result<MeResponseDto> {
        let user = self.resolve(identity).await?;

        Ok(MeResponseDto {
            id: user.id,
            token_identifier: user.token_identifier,
            name: user.name,
            image_url: user.image_url,
            memberships: user.memberships,
            active_org_id: identity.default_org_id().to_string(),
            created_at: user.created_at,
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfileDto> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfileDto::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Create or update a user from the identity provider
    pub async fn sync_user(&self, new_user: NewUser) -> Result<User> {
        let user = self.users.upsert(new_user).await?;
        tracing::info!("Synced user {} ({})", user.id, user.token_identifier);
        Ok(user)
    }

    pub async fn add_membership(
        &self,
        token_identifier: &str,
        org_id: &str,
        role: OrgRole,
    ) -> Result<User> {
        let user = self.find_by_token(token_identifier).await?;

        if self.users.add_membership(user.id, org_id, role).await? {
            tracing::info!("Added user {} to org {} as {:?}", user.id, org_id, role);
        } else {
            tracing::debug!("User {} already member of org {}", user.id, org_id);
        }

        self.find_by_token(token_identifier).await
    }

    pub async fn update_membership_role(
        &self,
        token_identifier: &str,
        org_id: &str,
        role: OrgRole,
    ) -> Result<User> {
        let user = self.find_by_token(token_identifier).await?;

        if !self
            .users
            .update_membership_role(user.id, org_id, role)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "User {} is not a member of org {}",
                user.id, org_id
            )));
        }

        tracing::info!("Changed role of user {} in org {} to {:?}", user.id, org_id, role);
        self.find_by_token(token_identifier).await
    }

    async fn find_by_token(&self, token_identifier: &str) -> Result<User> {
        self.users
            .find_by_token(token_identifier)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", token_identifier)))
    }
}
