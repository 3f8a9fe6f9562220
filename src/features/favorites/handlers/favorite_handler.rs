use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::dtos::{
    FavoriteResponseDto, ListFavoritesQuery, ToggleFavoriteResponseDto,
};
use crate::features::favorites::services::FavoriteService;
use crate::shared::types::{ApiResponse, Meta};

/// Toggle the caller's favorite on a file
#[utoipa::path(
    post,
    path = "/api/files/{id}/favorite",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Favorite toggled", body = ApiResponse<ToggleFavoriteResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Access denied"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "favorites",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn toggle_favorite(
    user: AuthenticatedUser,
    State(service): State<Arc<FavoriteService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ToggleFavoriteResponseDto>>> {
    let is_favorited = service.toggle(id, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(ToggleFavoriteResponseDto { is_favorited }),
        None,
        None,
    )))
}

/// List the caller's favorites in an organization
///
/// Anonymous callers and callers without access get an empty list.
#[utoipa::path(
    get,
    path = "/api/favorites",
    params(ListFavoritesQuery),
    responses(
        (status = 200, description = "Favorites retrieved", body = ApiResponse<Vec<FavoriteResponseDto>>)
    ),
    tag = "favorites",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_favorites(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<FavoriteService>>,
    Query(query): Query<ListFavoritesQuery>,
) -> Json<ApiResponse<Vec<FavoriteResponseDto>>> {
    let favorites = service
        .list_favorites(query.org_id.as_deref(), user.as_ref())
        .await;
    let meta = Meta::total(favorites.len());
    Json(ApiResponse::success(Some(favorites), None, Some(meta)))
}
