use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::{MembershipDto, SyncUserDto};
use crate::features::admin::services::AdminService;
use crate::features::files::dtos::PurgeReportDto;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::types::ApiResponse;

/// Create or update a user from the identity provider
#[utoipa::path(
    put,
    path = "/api/admin/users",
    request_body = SyncUserDto,
    responses(
        (status = 200, description = "User synced", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Admin credentials required")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn sync_user(
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<SyncUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.sync_user(dto).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

/// Add a user to an organization
///
/// Adding an existing member keeps their current role.
#[utoipa::path(
    post,
    path = "/api/admin/memberships",
    request_body = MembershipDto,
    responses(
        (status = 201, description = "Membership added", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Admin credentials required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn add_membership(
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<MembershipDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    let user = service.add_membership(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user), None, None)),
    ))
}

/// Change a member's role in an organization
#[utoipa::path(
    patch,
    path = "/api/admin/memberships",
    request_body = MembershipDto,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Admin credentials required"),
        (status = 404, description = "User or membership not found")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn update_membership_role(
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<MembershipDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.update_membership_role(dto).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

/// Run a purge sweep immediately
#[utoipa::path(
    post,
    path = "/api/admin/purge",
    responses(
        (status = 200, description = "Sweep finished", body = ApiResponse<PurgeReportDto>),
        (status = 401, description = "Admin credentials required"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn purge(
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<PurgeReportDto>>> {
    let report = service.purge_now().await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::admin::{routes, AdminService};
    use crate::features::users::models::OrgRole;
    use crate::shared::test_helpers::{identity, TestContext};
    use axum::http::{header, HeaderValue, StatusCode};
    use axum::Router;
    use axum_test::TestServer;
    use base64::prelude::*;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const CREDENTIALS: &str = "ops:secret";

    fn app(ctx: &TestContext) -> Router {
        let service = Arc::new(AdminService::new(ctx.identity.clone(), ctx.files.clone()));
        Router::new().nest(
            "/api/admin",
            routes::routes(service, Arc::new(CREDENTIALS.to_string())),
        )
    }

    fn basic_auth() -> HeaderValue {
        let encoded = BASE64_STANDARD.encode(CREDENTIALS);
        HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap()
    }

    #[tokio::test]
    async fn test_requires_basic_auth() {
        let ctx = TestContext::new();
        let server = TestServer::new(app(&ctx)).unwrap();

        let response = server.post("/api/admin/purge").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .is_some());
    }

    #[tokio::test]
    async fn test_sync_then_grant_membership() {
        let ctx = TestContext::new();
        let server = TestServer::new(app(&ctx)).unwrap();
        let caller = identity("user_1");

        let response = server
            .put("/api/admin/users")
            .add_header(header::AUTHORIZATION, basic_auth())
            .json(&json!({
                "token_identifier": caller.token_identifier,
                "name": "Ada"
            }))
            .await;
        response.assert_status_ok();

        let response = server
            .post("/api/admin/memberships")
            .add_header(header::AUTHORIZATION, basic_auth())
            .json(&json!({
                "token_identifier": caller.token_identifier,
                "org_id": "org_a",
                "role": "admin"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["name"], "Ada");
        assert_eq!(body["data"]["memberships"][0]["role"], "admin");

        let user = ctx.identity.resolve(&caller).await.unwrap();
        assert_eq!(user.role_in("org_a"), Some(OrgRole::Admin));
    }

    #[tokio::test]
    async fn test_update_role_of_non_member_is_not_found() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        ctx.user("user_1").await;
        let server = TestServer::new(app(&ctx)).unwrap();

        let response = server
            .patch("/api/admin/memberships")
            .add_header(header::AUTHORIZATION, basic_auth())
            .json(&json!({
                "token_identifier": caller.token_identifier,
                "org_id": "org_a",
                "role": "admin"
            }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_manual_purge_reports_counts() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        let file = ctx.stored_file(&caller, "user_1", "a.pdf").await;
        ctx.files.soft_delete(file.id, &caller).await.unwrap();
        let server = TestServer::new(app(&ctx)).unwrap();

        let response = server
            .post("/api/admin/purge")
            .add_header(header::AUTHORIZATION, basic_auth())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], json!({"purged": 1, "skipped": 0, "failed": 0}));
    }
}
