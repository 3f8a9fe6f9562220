use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kinds of files the service stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "file_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Pdf,
    Csv,
}

impl FileType {
    /// Map an upload's MIME type onto a file type. Only `image/*`,
    /// `application/pdf` and `text/csv` are accepted.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match mime.as_str() {
            "application/pdf" => Some(FileType::Pdf),
            "text/csv" => Some(FileType::Csv),
            m if m.starts_with("image/") && m.len() > "image/".len() => Some(FileType::Image),
            _ => None,
        }
    }
}

/// Database model for files
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    pub org_id: String,
    pub user_id: Uuid,
    pub name: String,
    pub file_type: FileType,
    pub blob_handle: String,
    pub should_delete: bool,
    pub created_at: DateTime<Utc>,
}

impl File {
    pub fn is_marked_for_deletion(&self) -> bool {
        self.should_delete
    }
}

/// Data for inserting a file
#[derive(Debug, Clone)]
pub struct NewFile {
    pub org_id: String,
    pub user_id: Uuid,
    pub name: String,
    pub file_type: FileType,
    pub blob_handle: String,
}

/// Result of purging a single marked file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Blob and row removed
    Purged,
    /// Row was restored, already gone, or locked by another sweep
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_content_type() {
        assert_eq!(FileType::from_content_type("image/png"), Some(FileType::Image));
        assert_eq!(FileType::from_content_type("image/svg+xml"), Some(FileType::Image));
        assert_eq!(FileType::from_content_type("application/pdf"), Some(FileType::Pdf));
        assert_eq!(
            FileType::from_content_type("text/csv; charset=utf-8"),
            Some(FileType::Csv)
        );
        assert_eq!(FileType::from_content_type("Text/CSV"), Some(FileType::Csv));
    }

    #[test]
    fn test_file_type_rejects_other_types() {
        assert_eq!(FileType::from_content_type("image/"), None);
        assert_eq!(FileType::from_content_type("application/zip"), None);
        assert_eq!(FileType::from_content_type("text/plain"), None);
        assert_eq!(FileType::from_content_type(""), None);
    }
}
