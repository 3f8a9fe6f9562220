mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::models::{File, NewFile, PurgeOutcome};
use crate::modules::storage::BlobStore;

pub use postgres::PgFileRepository;

/// Persistence for file metadata
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Insert an active file. A blob handle already registered to any file
    /// is rejected with the opaque access-denied error.
    async fn insert(&self, new_file: NewFile) -> Result<File>;

    async fn get(&self, id: Uuid) -> Result<Option<File>>;

    /// Set the deletion mark. Returns `false` when the file no longer exists.
    async fn set_should_delete(&self, id: Uuid, should_delete: bool) -> Result<bool>;

    /// All files of an organization in insertion order
    async fn list_by_org(&self, org_id: &str) -> Result<Vec<File>>;

    /// Ids of files marked for deletion, oldest first
    async fn list_marked(&self, limit: i64) -> Result<Vec<Uuid>>;

    /// Permanently remove a marked file: lock the row, re-check the mark,
    /// delete the blob, then delete the row (favorites cascade). A file that
    /// was restored, already purged, or is locked by another sweep is skipped.
    async fn purge_marked(&self, id: Uuid, blobs: &dyn BlobStore) -> Result<PurgeOutcome>;
}
