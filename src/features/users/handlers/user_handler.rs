use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{MeResponseDto, UserProfileDto};
use crate::features::users::services::IdentityService;
use crate::shared::types::ApiResponse;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<IdentityService>>,
) -> Result<Json<ApiResponse<MeResponseDto>>> {
    let me = service.me(&user).await?;
    Ok(Json(ApiResponse::success(Some(me), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/profile",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserProfileDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    _user: AuthenticatedUser,
    State(service): State<Arc<IdentityService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserProfileDto>>> {
    let profile = service.get_profile(id).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}
