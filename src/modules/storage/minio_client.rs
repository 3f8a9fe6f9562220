//! MinIO/S3-compatible blob store
//!
//! Issues presigned upload and download URLs for file blobs and deletes
//! them when files are purged. Uses the rust-s3 crate.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::BlobStore;
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

const NOT_FOUND: u16 = 404;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    presigned_url_expiry_secs: u32,
}

impl MinIOClient {
    /// Create a new MinIO client and make sure the bucket exists
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
        };

        client.ensure_bucket_exists().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}",
            config.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    /// Create the bucket if needed. Failures are logged, not fatal.
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    /// Check if a blob exists
    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, status)) if status == NOT_FOUND => Ok(false),
            Ok((_, status)) if is_success(status) => Ok(true),
            Ok((_, status)) => Err(unavailable("check", key, format!("HTTP {}", status))),
            Err(S3Error::HttpFailWithBody(NOT_FOUND, _)) => Ok(false),
            Err(e) => Err(unavailable("check", key, e)),
        }
    }
}

#[async_trait]
impl BlobStore for MinIOClient {
    async fn put(&self, handle: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(handle, &data, content_type)
            .await
            .map_err(|e| unavailable("upload", handle, e))?;

        if !is_success(response.status_code()) {
            return Err(unavailable(
                "upload",
                handle,
                format!("HTTP {}", response.status_code()),
            ));
        }

        debug!(
            "Uploaded blob '{}' ({} bytes) to bucket '{}'",
            handle,
            data.len(),
            self.bucket.name()
        );
        Ok(())
    }

    async fn presign_upload(&self, handle: &str) -> Result<String, AppError> {
        self.bucket
            .presign_put(handle, self.presigned_url_expiry_secs, None, None)
            .await
            .map_err(|e| unavailable("presign upload for", handle, e))
    }

    async fn url(&self, handle: &str) -> Result<Option<String>, AppError> {
        if !self.exists(handle).await? {
            return Ok(None);
        }

        let url = self
            .bucket
            .presign_get(handle, self.presigned_url_expiry_secs, None)
            .await
            .map_err(|e| unavailable("presign download for", handle, e))?;

        Ok(Some(url))
    }

    async fn delete(&self, handle: &str) -> Result<(), AppError> {
        let status = match self.bucket.delete_object(handle).await {
            Ok(response) => response.status_code(),
            Err(S3Error::HttpFailWithBody(NOT_FOUND, _)) => NOT_FOUND,
            Err(e) => return Err(unavailable("delete", handle, e)),
        };

        if status == NOT_FOUND {
            debug!("Blob '{}' already gone", handle);
            return Ok(());
        }
        if !is_success(status) {
            return Err(unavailable("delete", handle, format!("HTTP {}", status)));
        }

        debug!(
            "Deleted blob '{}' from bucket '{}'",
            handle,
            self.bucket.name()
        );
        Ok(())
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn unavailable(action: &str, key: &str, cause: impl std::fmt::Display) -> AppError {
    AppError::ExternalServiceError(format!("Failed to {} blob '{}': {}", action, key, cause))
}
