use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::access;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::dtos::FavoriteResponseDto;
use crate::features::favorites::repositories::FavoriteRepository;
use crate::features::files::repositories::FileRepository;
use crate::features::users::IdentityService;

/// Per-user favorites, scoped to the file's organization
pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
    files: Arc<dyn FileRepository>,
    identity: Arc<IdentityService>,
}

impl FavoriteService {
    pub fn new(
        favorites: Arc<dyn FavoriteRepository>,
        files: Arc<dyn FileRepository>,
        identity: Arc<IdentityService>,
    ) -> Self {
        Self {
            favorites,
            files,
            identity,
        }
    }

    /// Flip the caller's favorite on a file and return the new state
    pub async fn toggle(&self, file_id: Uuid, caller: &AuthenticatedUser) -> Result<bool> {
        let user = self.identity.resolve(caller).await?;

        let file = self
            .files
            .get(file_id)
            .await?
            .ok_or_else(AppError::access_denied)?;

        if !access::has_access_to_file(&user, &file) {
            tracing::debug!("User {} denied favorite on file {}", user.id, file.id);
            return Err(AppError::access_denied());
        }

        let is_favorited = self
            .favorites
            .toggle(user.id, &file.org_id, file.id)
            .await?;

        tracing::info!(
            "User {} {} file {}",
            user.id,
            if is_favorited { "favorited" } else { "unfavorited" },
            file.id
        );
        Ok(is_favorited)
    }

    /// Ids of the files the user favorited in an organization
    pub async fn list_for_user(&self, user_id: Uuid, org_id: &str) -> Result<HashSet<Uuid>> {
        let favorites = self.favorites.list_for_user(user_id, org_id).await?;
        Ok(favorites.into_iter().map(|fav| fav.file_id).collect())
    }

    /// The caller's favorites in an organization. Fails soft to an empty list.
    pub async fn list_favorites(
        &self,
        org_id: Option<&str>,
        caller: Option<&AuthenticatedUser>,
    ) -> Vec<FavoriteResponseDto> {
        let Some((user, org_id)) = self.identity.authorize_read(caller, org_id).await else {
            return Vec::new();
        };

        match self.favorites.list_for_user(user.id, &org_id).await {
            Ok(favorites) => favorites.into_iter().map(Into::into).collect(),
            Err(e) => {
                tracing::warn!("Failed to list favorites of user {}: {}", user.id, e);
                Vec::new()
            }
        }
    }
}
