use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    CreateFileDto, FileResponseDto, ListFilesQuery, PreviewUrlQuery, PreviewUrlResponseDto,
    UploadBlobResponseDto, UploadFileDto, UploadTargetResponseDto,
};
use crate::features::files::services::FileService;
use crate::shared::types::{ApiResponse, Meta};

/// Register an uploaded blob as a file
#[utoipa::path(
    post,
    path = "/api/files",
    request_body = CreateFileDto,
    responses(
        (status = 201, description = "File created", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Access denied"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppJson(dto): AppJson<CreateFileDto>,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>)> {
    let file = service.create_file(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(file),
            Some("File created".to_string()),
            None,
        )),
    ))
}

/// List files of an organization
///
/// Anonymous callers and callers without access get an empty list.
#[utoipa::path(
    get,
    path = "/api/files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Files retrieved", body = ApiResponse<Vec<FileResponseDto>>)
    ),
    tag = "files",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<FileService>>,
    Query(query): Query<ListFilesQuery>,
) -> Json<ApiResponse<Vec<FileResponseDto>>> {
    let files = service.list_files(user.as_ref(), &query).await;
    let meta = Meta::total(files.len());
    Json(ApiResponse::success(Some(files), None, Some(meta)))
}

/// Move a file to the trash
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File marked for deletion"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Access denied"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn soft_delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.soft_delete(id, &user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("File marked for deletion".to_string()),
        None,
    )))
}

/// Take a file out of the trash
#[utoipa::path(
    post,
    path = "/api/files/{id}/restore",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File restored"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Access denied"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn restore_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.restore(id, &user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("File restored".to_string()),
        None,
    )))
}

/// Get a presigned URL to upload file content to
#[utoipa::path(
    post,
    path = "/api/files/upload-url",
    responses(
        (status = 200, description = "Upload target issued", body = ApiResponse<UploadTargetResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn generate_upload_url(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<UploadTargetResponseDto>>> {
    let target = service.generate_upload_target(&user).await?;
    Ok(Json(ApiResponse::success(Some(target), None, None)))
}

/// Upload file content through the API
///
/// Accepts multipart/form-data with a single `file` field.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Image, PDF or CSV file",
    ),
    responses(
        (status = 201, description = "Content uploaded", body = ApiResponse<UploadBlobResponseDto>),
        (status = 400, description = "Invalid file or validation error"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadBlobResponseDto>>)> {
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        upload = Some((data.to_vec(), content_type));
    }

    let (data, content_type) =
        upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let uploaded = service.upload_blob(&user, data, &content_type).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(uploaded), None, None)),
    ))
}

/// Get a time-limited download URL for a blob
#[utoipa::path(
    get,
    path = "/api/files/preview-url",
    params(PreviewUrlQuery),
    responses(
        (status = 200, description = "URL generated, null when the blob is missing", body = ApiResponse<PreviewUrlResponseDto>),
        (status = 400, description = "Invalid blob handle"),
        (status = 401, description = "Authentication required"),
        (status = 503, description = "Storage temporarily unavailable")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn preview_url(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<PreviewUrlQuery>,
) -> Result<Json<ApiResponse<PreviewUrlResponseDto>>> {
    let url = service.preview_url(&user, &query.blob_handle).await?;
    Ok(Json(ApiResponse::success(
        Some(PreviewUrlResponseDto { url }),
        None,
        None,
    )))
}
