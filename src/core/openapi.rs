use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::favorites::{dtos as favorites_dtos, handlers::favorite_handler};
use crate::features::files::{dtos as files_dtos, handlers::file_handler, models as files_models};
use crate::features::users::{dtos as users_dtos, handlers::user_handler, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        user_handler::get_me,
        user_handler::get_profile,
        // Files
        file_handler::create_file,
        file_handler::list_files,
        file_handler::soft_delete_file,
        file_handler::restore_file,
        file_handler::generate_upload_url,
        file_handler::upload_file,
        file_handler::preview_url,
        // Favorites
        favorite_handler::toggle_favorite,
        favorite_handler::list_favorites,
        // Admin
        admin_handlers::sync_user,
        admin_handlers::add_membership,
        admin_handlers::update_membership_role,
        admin_handlers::purge,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Users
            users_models::OrgRole,
            users_models::Membership,
            users_dtos::MeResponseDto,
            users_dtos::UserProfileDto,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::MeResponseDto>,
            ApiResponse<users_dtos::UserProfileDto>,
            ApiResponse<users_dtos::UserResponseDto>,
            // Files
            files_models::FileType,
            files_dtos::CreateFileDto,
            files_dtos::FileResponseDto,
            files_dtos::UploadTargetResponseDto,
            files_dtos::UploadFileDto,
            files_dtos::UploadBlobResponseDto,
            files_dtos::PreviewUrlResponseDto,
            files_dtos::PurgeReportDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<files_dtos::UploadTargetResponseDto>,
            ApiResponse<files_dtos::UploadBlobResponseDto>,
            ApiResponse<files_dtos::PreviewUrlResponseDto>,
            ApiResponse<files_dtos::PurgeReportDto>,
            // Favorites
            favorites_dtos::FavoriteResponseDto,
            favorites_dtos::ToggleFavoriteResponseDto,
            ApiResponse<Vec<favorites_dtos::FavoriteResponseDto>>,
            ApiResponse<favorites_dtos::ToggleFavoriteResponseDto>,
            // Admin
            admin_dtos::SyncUserDto,
            admin_dtos::MembershipDto,
        )
    ),
    tags(
        (name = "users", description = "Current user and uploader profiles"),
        (name = "files", description = "File registry, uploads and the trash"),
        (name = "favorites", description = "Per-user favorites"),
        (name = "admin", description = "Operator endpoints (basic auth)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Drive API",
        version = "0.1.0",
        description = "Multi-tenant file storage API",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT and admin basic auth schemes to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
