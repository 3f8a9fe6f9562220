use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::{File, FileType};
use crate::shared::constants::MAX_FILE_NAME_LENGTH;
use crate::shared::validation::{not_blank, BLOB_HANDLE_REGEX};

/// Register an uploaded blob as a file of an organization
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFileDto {
    #[validate(length(
        min = 1,
        max = MAX_FILE_NAME_LENGTH,
        message = "Name must be 1-255 characters"
    ))]
    #[schema(example = "q3-report.pdf")]
    pub name: String,
    /// Handle returned by the upload endpoints
    #[validate(regex(path = *BLOB_HANDLE_REGEX, message = "Invalid blob handle"))]
    pub blob_handle: String,
    #[validate(custom(function = "not_blank", message = "org_id is required"))]
    pub org_id: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListFilesQuery {
    /// Organization to list; defaults to the caller's active organization
    pub org_id: Option<String>,
    /// Case-sensitive substring of the file name
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,
    /// Only files the caller favorited
    #[serde(default)]
    pub favorites_only: bool,
    /// Only files marked for deletion (the trash view)
    #[serde(default)]
    pub deleted_only: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    pub org_id: String,
    /// Uploader
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub blob_handle: String,
    pub should_delete: bool,
    pub is_favorited: bool,
    pub created_at: DateTime<Utc>,
}

impl FileResponseDto {
    pub fn from_file(file: File, is_favorited: bool) -> Self {
        Self {
            id: file.id,
            org_id: file.org_id,
            user_id: file.user_id,
            name: file.name,
            file_type: file.file_type,
            blob_handle: file.blob_handle,
            should_delete: file.should_delete,
            is_favorited,
            created_at: file.created_at,
        }
    }
}

/// Where to PUT the file content, and the handle to register it under
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadTargetResponseDto {
    pub upload_url: String,
    pub blob_handle: String,
}

/// Multipart upload form, for Swagger UI documentation only.
/// The handler reads the body with axum's Multipart extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// Image, PDF or CSV, up to 10MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadBlobResponseDto {
    pub blob_handle: String,
    /// File type derived from the upload's content type
    #[serde(rename = "type")]
    pub file_type: FileType,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PreviewUrlQuery {
    pub blob_handle: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreviewUrlResponseDto {
    /// Time-limited download URL, null when the blob does not exist
    pub url: Option<String>,
}

/// Counts from one purge sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PurgeReportDto {
    pub purged: usize,
    pub skipped: usize,
    pub failed: usize,
}
