//! In-process blob store for local development and tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::BlobStore;
use crate::core::error::AppError;

struct StoredBlob {
    data: Vec<u8>,
    content_type: String,
}

/// Keeps blobs in memory, keyed by handle. URLs use the `memory://` scheme.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredBlob>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.blobs().contains_key(handle)
    }
}

#[cfg(test)]
impl MemoryBlobStore {
    pub fn len(&self) -> usize {
        self.blobs().len()
    }

    pub fn content_type(&self, handle: &str) -> Option<String> {
        self.blobs().get(handle).map(|b| b.content_type.clone())
    }

    pub fn size(&self, handle: &str) -> Option<usize> {
        self.blobs().get(handle).map(|b| b.data.len())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, handle: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        tracing::debug!("Memory store: put '{}' ({} bytes)", handle, data.len());
        self.blobs().insert(
            handle.to_string(),
            StoredBlob {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_upload(&self, handle: &str) -> Result<String, AppError> {
        Ok(format!("memory://{}?upload", handle))
    }

    async fn url(&self, handle: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .contains(handle)
            .then(|| format!("memory://{}", handle)))
    }

    async fn delete(&self, handle: &str) -> Result<(), AppError> {
        self.blobs().remove(handle);
        Ok(())
    }
}
