//! Blob storage for file contents
//!
//! File metadata lives in the registry; the bytes live behind an opaque
//! blob handle in a [`BlobStore`]. Production uses MinIO/S3, local
//! development and tests use the in-process store.

mod memory_store;
mod minio_client;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::BLOB_HANDLE_PREFIX;

pub use memory_store::MemoryBlobStore;
pub use minio_client::MinIOClient;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `handle`, replacing any previous content
    async fn put(&self, handle: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Time-limited URL the client can PUT the file content to
    async fn presign_upload(&self, handle: &str) -> Result<String, AppError>;

    /// Time-limited download URL, `None` when no blob exists for `handle`
    async fn url(&self, handle: &str) -> Result<Option<String>, AppError>;

    /// Remove the blob. Deleting a missing blob succeeds.
    async fn delete(&self, handle: &str) -> Result<(), AppError>;
}

/// Fresh handle for a new upload
pub fn generate_handle() -> String {
    format!("{}{}", BLOB_HANDLE_PREFIX, Uuid::now_v7())
}
