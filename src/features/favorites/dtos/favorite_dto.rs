use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::favorites::models::Favorite;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFavoritesQuery {
    /// Organization to list; defaults to the caller's active organization
    pub org_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoriteResponseDto {
    pub file_id: Uuid,
    pub org_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<Favorite> for FavoriteResponseDto {
    fn from(favorite: Favorite) -> Self {
        Self {
            file_id: favorite.file_id,
            org_id: favorite.org_id,
            created_at: favorite.created_at,
        }
    }
}

/// Result of a favorite toggle
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleFavoriteResponseDto {
    pub is_favorited: bool,
}
