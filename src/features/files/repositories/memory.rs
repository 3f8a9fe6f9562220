use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::FileRepository;
use crate::core::error::{AppError, Result};
use crate::core::memory_db::MemoryDatabase;
use crate::features::files::models::{File, NewFile, PurgeOutcome};
use crate::modules::storage::BlobStore;

#[async_trait]
impl FileRepository for MemoryDatabase {
    async fn insert(&self, new_file: NewFile) -> Result<File> {
        let mut tables = self.lock().await;

        if tables
            .files
            .iter()
            .any(|f| f.blob_handle == new_file.blob_handle)
        {
            return Err(AppError::access_denied());
        }

        let file = File {
            id: Uuid::now_v7(),
            org_id: new_file.org_id,
            user_id: new_file.user_id,
            name: new_file.name,
            file_type: new_file.file_type,
            blob_handle: new_file.blob_handle,
            should_delete: false,
            created_at: Utc::now(),
        };

        tables.files.push(file.clone());
        Ok(file)
    }

    async fn get(&self, id: Uuid) -> Result<Option<File>> {
        let tables = self.lock().await;
        Ok(tables.files.iter().find(|f| f.id == id).cloned())
    }

    async fn set_should_delete(&self, id: Uuid, should_delete: bool) -> Result<bool> {
        let mut tables = self.lock().await;
        match tables.files.iter_mut().find(|f| f.id == id) {
            Some(file) => {
                file.should_delete = should_delete;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_org(&self, org_id: &str) -> Result<Vec<File>> {
        let tables = self.lock().await;
        Ok(tables
            .files
            .iter()
            .filter(|f| f.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn list_marked(&self, limit: i64) -> Result<Vec<Uuid>> {
        let tables = self.lock().await;
        Ok(tables
            .files
            .iter()
            .filter(|f| f.should_delete)
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|f| f.id)
            .collect())
    }

    async fn purge_marked(&self, id: Uuid, blobs: &dyn BlobStore) -> Result<PurgeOutcome> {
        // Held across the blob delete so a concurrent restore waits
        let mut tables = self.lock().await;

        let Some(position) = tables
            .files
            .iter()
            .position(|f| f.id == id && f.should_delete)
        else {
            return Ok(PurgeOutcome::Skipped);
        };

        blobs.delete(&tables.files[position].blob_handle).await?;

        tables.files.remove(position);
        tables.favorites.retain(|fav| fav.file_id != id);
        Ok(PurgeOutcome::Purged)
    }
}
