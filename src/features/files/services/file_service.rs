use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::core::config::PurgeConfig;
use crate::core::error::{AppError, Result};
use crate::features::access;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::FavoriteService;
use crate::features::files::dtos::{
    CreateFileDto, FileResponseDto, ListFilesQuery, PurgeReportDto, UploadBlobResponseDto,
    UploadTargetResponseDto,
};
use crate::features::files::models::{File, FileType, NewFile, PurgeOutcome};
use crate::features::files::repositories::FileRepository;
use crate::features::users::models::User;
use crate::features::users::IdentityService;
use crate::modules::storage::{self, BlobStore};
use crate::shared::constants::{ALLOWED_DOCUMENT_TYPES, MAX_UPLOAD_SIZE};
use crate::shared::validation::BLOB_HANDLE_REGEX;

/// File lifecycle (create, soft delete, restore, purge) and listing
pub struct FileService {
    files: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
    identity: Arc<IdentityService>,
    favorites: Arc<FavoriteService>,
    purge: PurgeConfig,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<IdentityService>,
        favorites: Arc<FavoriteService>,
        purge: PurgeConfig,
    ) -> Self {
        Self {
            files,
            blobs,
            identity,
            favorites,
            purge,
        }
    }

    /// Register an uploaded blob as a new active file owned by the caller
    pub async fn create_file(
        &self,
        caller: &AuthenticatedUser,
        dto: CreateFileDto,
    ) -> Result<FileResponseDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self.identity.resolve(caller).await?;

        if !access::has_access_to_org(&user, &dto.org_id) {
            debug!("User {} denied create in org {}", user.id, dto.org_id);
            return Err(AppError::access_denied());
        }

        let file = self
            .files
            .insert(NewFile {
                org_id: dto.org_id,
                user_id: user.id,
                name: dto.name,
                file_type: dto.file_type,
                blob_handle: dto.blob_handle,
            })
            .await?;

        info!(
            "File created: id={}, org={}, type={:?}, by={}",
            file.id, file.org_id, file.file_type, user.id
        );

        Ok(FileResponseDto::from_file(file, false))
    }

    /// Mark a file for deletion. Marking a marked file is a no-op.
    pub async fn soft_delete(&self, file_id: Uuid, caller: &AuthenticatedUser) -> Result<()> {
        let (user, file) = self.authorize_lifecycle(file_id, caller).await?;

        if file.is_marked_for_deletion() {
            debug!("File {} already marked for deletion", file.id);
            return Ok(());
        }

        self.set_mark(file.id, true).await?;
        info!("File {} marked for deletion by {}", file.id, user.id);
        Ok(())
    }

    /// Clear a file's deletion mark. Restoring an active file is a no-op.
    pub async fn restore(&self, file_id: Uuid, caller: &AuthenticatedUser) -> Result<()> {
        let (user, file) = self.authorize_lifecycle(file_id, caller).await?;

        if !file.is_marked_for_deletion() {
            debug!("File {} is not marked for deletion", file.id);
            return Ok(());
        }

        self.set_mark(file.id, false).await?;
        info!("File {} restored by {}", file.id, user.id);
        Ok(())
    }

    /// Issue a fresh blob handle and a presigned URL to upload its content
    pub async fn generate_upload_target(
        &self,
        caller: &AuthenticatedUser,
    ) -> Result<UploadTargetResponseDto> {
        let blob_handle = storage::generate_handle();
        let upload_url = self.blobs.presign_upload(&blob_handle).await?;

        debug!("Issued upload target {} to {}", blob_handle, caller.token_identifier);
        Ok(UploadTargetResponseDto {
            upload_url,
            blob_handle,
        })
    }

    /// Store uploaded bytes directly and return their handle
    pub async fn upload_blob(
        &self,
        caller: &AuthenticatedUser,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadBlobResponseDto> {
        if data.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                MAX_UPLOAD_SIZE,
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        let file_type = FileType::from_content_type(content_type).ok_or_else(|| {
            AppError::Validation(format!(
                "File type '{}' is not allowed. Allowed types: image/*, {}",
                content_type,
                ALLOWED_DOCUMENT_TYPES.join(", ")
            ))
        })?;

        let blob_handle = storage::generate_handle();
        let size = data.len();
        self.blobs.put(&blob_handle, data, content_type).await?;

        info!(
            "Blob uploaded: handle={}, type={:?}, size={}, by={}",
            blob_handle, file_type, size, caller.token_identifier
        );

        Ok(UploadBlobResponseDto {
            blob_handle,
            file_type,
        })
    }

    /// Presigned download URL, or `None` when the blob does not exist
    pub async fn preview_url(
        &self,
        caller: &AuthenticatedUser,
        blob_handle: &str,
    ) -> Result<Option<String>> {
        if !BLOB_HANDLE_REGEX.is_match(blob_handle) {
            return Err(AppError::Validation("Invalid blob handle".to_string()));
        }

        let url = self.blobs.url(blob_handle).await?;
        debug!(
            "Preview of {} for {}: {}",
            blob_handle,
            caller.token_identifier,
            if url.is_some() { "found" } else { "missing" }
        );
        Ok(url)
    }

    /// Files of an organization visible to the caller.
    ///
    /// Never fails: anonymous callers, callers without access and store
    /// outages all produce an empty list.
    pub async fn list_files(
        &self,
        caller: Option<&AuthenticatedUser>,
        query: &ListFilesQuery,
    ) -> Vec<FileResponseDto> {
        let Some((user, org_id)) = self
            .identity
            .authorize_read(caller, query.org_id.as_deref())
            .await
        else {
            return Vec::new();
        };

        let files = match self.files.list_by_org(&org_id).await {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to list files of org {}: {}", org_id, e);
                return Vec::new();
            }
        };

        let favorite_ids = match self.favorites.list_for_user(user.id, &org_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to load favorites of user {}: {}", user.id, e);
                return Vec::new();
            }
        };

        filter_files(files, &favorite_ids, query)
    }

    /// Permanently remove every file marked for deletion.
    ///
    /// Marked files are taken in batches of `batch_size` until a batch comes
    /// back short or purges nothing. Files in a batch are
    /// processed concurrently and independently; a failure is logged,
    /// counted, and leaves the file marked for the next sweep.
    pub async fn purge_sweep(&self) -> Result<PurgeReportDto> {
        let mut report = PurgeReportDto::default();

        loop {
            let ids = self.files.list_marked(self.purge.batch_size).await?;
            let full_batch = ids.len() as i64 >= self.purge.batch_size;
            if ids.is_empty() {
                break;
            }

            debug!("Purging batch of {} marked files", ids.len());
            let batch = self.purge_batch(ids).await;

            report.purged += batch.purged;
            report.skipped += batch.skipped;
            report.failed += batch.failed;

            if !full_batch || batch.purged == 0 {
                break;
            }
        }

        if report != PurgeReportDto::default() {
            info!(
                "Purge sweep finished: purged={}, skipped={}, failed={}",
                report.purged, report.skipped, report.failed
            );
        }
        Ok(report)
    }

    async fn purge_batch(&self, ids: Vec<Uuid>) -> PurgeReportDto {
        let outcomes: Vec<(Uuid, Result<PurgeOutcome>)> = stream::iter(ids)
            .map(|id| async move {
                let outcome = self.files.purge_marked(id, self.blobs.as_ref()).await;
                (id, outcome)
            })
            .buffer_unordered(self.purge.concurrency)
            .collect()
            .await;

        let mut report = PurgeReportDto::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(PurgeOutcome::Purged) => report.purged += 1,
                Ok(PurgeOutcome::Skipped) => {
                    debug!("Skipped purge of file {}", id);
                    report.skipped += 1;
                }
                Err(e) => {
                    error!("Failed to purge file {}: {}", id, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Load a file for delete/restore. Missing files and missing rights are
    /// reported identically.
    async fn authorize_lifecycle(
        &self,
        file_id: Uuid,
        caller: &AuthenticatedUser,
    ) -> Result<(User, File)> {
        let user = self.identity.resolve(caller).await?;

        let file = self
            .files
            .get(file_id)
            .await?
            .ok_or_else(AppError::access_denied)?;

        if !access::has_access_to_file(&user, &file) || !access::can_delete_or_restore(&user, &file)
        {
            debug!("User {} denied lifecycle change on file {}", user.id, file.id);
            return Err(AppError::access_denied());
        }

        Ok((user, file))
    }

    async fn set_mark(&self, file_id: Uuid, should_delete: bool) -> Result<()> {
        // The row can disappear under a concurrent purge
        if !self.files.set_should_delete(file_id, should_delete).await? {
            return Err(AppError::access_denied());
        }
        Ok(())
    }
}

/// Apply the listing filters in order: name, deletion state, favorites,
/// type; then annotate favorites.
fn filter_files(
    files: Vec<File>,
    favorite_ids: &HashSet<Uuid>,
    query: &ListFilesQuery,
) -> Vec<FileResponseDto> {
    let name_query = query.query.as_deref().filter(|q| !q.is_empty());

    files
        .into_iter()
        .filter(|f| name_query.map_or(true, |q| f.name.contains(q)))
        .filter(|f| f.should_delete == query.deleted_only)
        .filter(|f| !query.favorites_only || favorite_ids.contains(&f.id))
        .filter(|f| query.file_type.map_or(true, |t| f.file_type == t))
        .map(|f| {
            let is_favorited = favorite_ids.contains(&f.id);
            FileResponseDto::from_file(f, is_favorited)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::OrgRole;
    use crate::shared::test_helpers::{identity, TestContext};

    fn query() -> ListFilesQuery {
        ListFilesQuery::default()
    }

    fn names(files: &[FileResponseDto]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    fn create_dto(org_id: &str, name: &str) -> CreateFileDto {
        CreateFileDto {
            name: name.to_string(),
            blob_handle: storage::generate_handle(),
            org_id: org_id.to_string(),
            file_type: FileType::Pdf,
        }
    }

    #[tokio::test]
    async fn test_create_requires_org_access() {
        let ctx = TestContext::new();
        let caller = identity("user_1");

        let result = ctx.files.create_file(&caller, create_dto("org_x", "a.pdf")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // No row was inserted
        ctx.member(&caller, "org_x", OrgRole::Member).await;
        assert!(ctx
            .files
            .list_files(Some(&caller), &ListFilesQuery {
                org_id: Some("org_x".to_string()),
                ..query()
            })
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_role_claim_grants_nothing_without_membership() {
        let ctx = TestContext::new();
        let caller = AuthenticatedUser {
            org_id: Some("org_x".to_string()),
            org_role: Some("admin".to_string()),
            ..identity("user_1")
        };

        let result = ctx.files.create_file(&caller, create_dto("org_x", "a.pdf")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_in_personal_workspace() {
        let ctx = TestContext::new();
        let caller = identity("user_1");

        let file = ctx
            .files
            .create_file(&caller, create_dto("user_1", "a.pdf"))
            .await
            .unwrap();
        let user = ctx.identity.resolve(&caller).await.unwrap();

        assert_eq!(file.user_id, user.id);
        assert!(!file.should_delete);
        assert!(!file.is_favorited);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let ctx = TestContext::new();
        let caller = identity("user_1");

        let mut dto = create_dto("user_1", "a.pdf");
        dto.blob_handle = "../../etc/passwd".to_string();
        let result = ctx.files.create_file(&caller, dto).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = ctx.files.create_file(&caller, create_dto("user_1", "")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore_partition_views() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        let file = ctx.file(&caller, "user_1", "a.pdf", FileType::Pdf).await;

        ctx.files.soft_delete(file.id, &caller).await.unwrap();
        assert!(ctx.files.list_files(Some(&caller), &query()).await.is_empty());
        let trash = ctx
            .files
            .list_files(Some(&caller), &ListFilesQuery {
                deleted_only: true,
                ..query()
            })
            .await;
        assert_eq!(names(&trash), vec!["a.pdf"]);

        ctx.files.restore(file.id, &caller).await.unwrap();
        assert_eq!(
            names(&ctx.files.list_files(Some(&caller), &query()).await),
            vec!["a.pdf"]
        );
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore_are_idempotent() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        let file = ctx.file(&caller, "user_1", "a.pdf", FileType::Pdf).await;

        ctx.files.soft_delete(file.id, &caller).await.unwrap();
        ctx.files.soft_delete(file.id, &caller).await.unwrap();
        assert!(ctx.db_file(file.id).await.unwrap().should_delete);

        ctx.files.restore(file.id, &caller).await.unwrap();
        ctx.files.restore(file.id, &caller).await.unwrap();
        assert!(!ctx.db_file(file.id).await.unwrap().should_delete);
    }

    #[tokio::test]
    async fn test_member_cannot_delete_others_file_but_admin_can() {
        let ctx = TestContext::new();
        let owner = identity("owner");
        let member = identity("member");
        let admin = identity("admin");
        ctx.member(&owner, "org_a", OrgRole::Member).await;
        ctx.member(&member, "org_a", OrgRole::Member).await;
        ctx.member(&admin, "org_a", OrgRole::Admin).await;
        let file = ctx.file(&owner, "org_a", "a.pdf", FileType::Pdf).await;

        let result = ctx.files.soft_delete(file.id, &member).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(!ctx.db_file(file.id).await.unwrap().should_delete);

        ctx.files.soft_delete(file.id, &admin).await.unwrap();
        assert!(ctx.db_file(file.id).await.unwrap().should_delete);

        let result = ctx.files.restore(file.id, &member).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        ctx.files.restore(file.id, &admin).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_and_denial_look_the_same() {
        let ctx = TestContext::new();
        let owner = identity("owner");
        let stranger = identity("stranger");
        let file = ctx.file(&owner, "owner", "a.pdf", FileType::Pdf).await;

        let denied = ctx.files.soft_delete(file.id, &stranger).await.unwrap_err();
        let missing = ctx
            .files
            .soft_delete(Uuid::now_v7(), &stranger)
            .await
            .unwrap_err();

        assert_eq!(denied.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn test_list_filters_by_name_type_and_favorites() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        let report = ctx.file(&caller, "user_1", "Report.pdf", FileType::Pdf).await;
        ctx.file(&caller, "user_1", "report-data.csv", FileType::Csv).await;
        ctx.file(&caller, "user_1", "photo.png", FileType::Image).await;
        ctx.favorites.toggle(report.id, &caller).await.unwrap();

        // Case-sensitive substring
        let found = ctx
            .files
            .list_files(Some(&caller), &ListFilesQuery {
                query: Some("report".to_string()),
                ..query()
            })
            .await;
        assert_eq!(names(&found), vec!["report-data.csv"]);

        let found = ctx
            .files
            .list_files(Some(&caller), &ListFilesQuery {
                file_type: Some(FileType::Image),
                ..query()
            })
            .await;
        assert_eq!(names(&found), vec!["photo.png"]);

        let found = ctx
            .files
            .list_files(Some(&caller), &ListFilesQuery {
                favorites_only: true,
                ..query()
            })
            .await;
        assert_eq!(names(&found), vec!["Report.pdf"]);
        assert!(found[0].is_favorited);

        // Insertion order is kept and favorites are annotated
        let all = ctx.files.list_files(Some(&caller), &query()).await;
        assert_eq!(names(&all), vec!["Report.pdf", "report-data.csv", "photo.png"]);
        assert_eq!(
            all.iter().map(|f| f.is_favorited).collect::<Vec<_>>(),
            vec![true, false, false]
        );
    }

    #[tokio::test]
    async fn test_list_fails_soft() {
        let ctx = TestContext::new();
        let owner = identity("owner");
        ctx.file(&owner, "owner", "a.pdf", FileType::Pdf).await;

        let q = ListFilesQuery {
            org_id: Some("owner".to_string()),
            ..query()
        };
        assert!(ctx.files.list_files(None, &q).await.is_empty());
        assert!(ctx
            .files
            .list_files(Some(&identity("stranger")), &q)
            .await
            .is_empty());
        assert_eq!(ctx.files.list_files(Some(&owner), &q).await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_defaults_to_org_claim() {
        let ctx = TestContext::new();
        let mut caller = identity("user_1");
        ctx.member(&caller, "org_a", OrgRole::Member).await;
        ctx.file(&caller, "org_a", "shared.pdf", FileType::Pdf).await;
        ctx.file(&caller, "user_1", "mine.pdf", FileType::Pdf).await;

        assert_eq!(
            names(&ctx.files.list_files(Some(&caller), &query()).await),
            vec!["mine.pdf"]
        );

        caller.org_id = Some("org_a".to_string());
        assert_eq!(
            names(&ctx.files.list_files(Some(&caller), &query()).await),
            vec!["shared.pdf"]
        );
    }

    #[tokio::test]
    async fn test_upload_blob_checks_type_and_size() {
        let ctx = TestContext::new();
        let caller = identity("user_1");

        let uploaded = ctx
            .files
            .upload_blob(&caller, b"a,b\n1,2\n".to_vec(), "text/csv")
            .await
            .unwrap();
        assert_eq!(uploaded.file_type, FileType::Csv);
        assert!(ctx.blobs.contains(&uploaded.blob_handle));

        let result = ctx
            .files
            .upload_blob(&caller, vec![0; 4], "application/zip")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = ctx
            .files
            .upload_blob(&caller, vec![0; MAX_UPLOAD_SIZE + 1], "image/png")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(ctx.blobs.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_url_null_for_missing_blob() {
        let ctx = TestContext::new();
        let caller = identity("user_1");

        let target = ctx.files.generate_upload_target(&caller).await.unwrap();
        assert!(BLOB_HANDLE_REGEX.is_match(&target.blob_handle));
        assert!(ctx
            .files
            .preview_url(&caller, &target.blob_handle)
            .await
            .unwrap()
            .is_none());

        let uploaded = ctx
            .files
            .upload_blob(&caller, vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert!(ctx
            .files
            .preview_url(&caller, &uploaded.blob_handle)
            .await
            .unwrap()
            .is_some());

        let result = ctx.files.preview_url(&caller, "not-a-handle").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_purge_removes_only_marked_files() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        let keep = ctx.stored_file(&caller, "user_1", "keep.pdf").await;
        let drop = ctx.stored_file(&caller, "user_1", "drop.pdf").await;
        ctx.favorites.toggle(drop.id, &caller).await.unwrap();
        ctx.files.soft_delete(drop.id, &caller).await.unwrap();

        let report = ctx.files.purge_sweep().await.unwrap();
        assert_eq!(
            report,
            PurgeReportDto {
                purged: 1,
                skipped: 0,
                failed: 0
            }
        );

        assert!(ctx.db_file(drop.id).await.is_none());
        assert!(!ctx.blobs.contains(&drop.blob_handle));
        assert!(ctx.db_file(keep.id).await.is_some());
        assert!(ctx.blobs.contains(&keep.blob_handle));

        // Favorites of the purged file are gone
        let user = ctx.identity.resolve(&caller).await.unwrap();
        assert!(ctx
            .favorites
            .list_for_user(user.id, "user_1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_purge_tolerates_missing_blob_and_is_idempotent() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        // Registered without ever uploading content
        let file = ctx.file(&caller, "user_1", "ghost.pdf", FileType::Pdf).await;
        ctx.files.soft_delete(file.id, &caller).await.unwrap();

        let first = ctx.files.purge_sweep().await.unwrap();
        assert_eq!(first.purged, 1);

        let second = ctx.files.purge_sweep().await.unwrap();
        assert_eq!(second, PurgeReportDto::default());
    }

    #[tokio::test]
    async fn test_restore_before_purge_keeps_file() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        let file = ctx.stored_file(&caller, "user_1", "a.pdf").await;

        ctx.files.soft_delete(file.id, &caller).await.unwrap();
        ctx.files.restore(file.id, &caller).await.unwrap();

        let report = ctx.files.purge_sweep().await.unwrap();
        assert_eq!(report.purged, 0);
        assert!(ctx.db_file(file.id).await.is_some());
        assert!(ctx.blobs.contains(&file.blob_handle));
    }

    #[tokio::test]
    async fn test_restore_after_purge_is_denied() {
        let ctx = TestContext::new();
        let caller = identity("user_1");
        let file = ctx.stored_file(&caller, "user_1", "a.pdf").await;
        ctx.files.soft_delete(file.id, &caller).await.unwrap();
        ctx.files.purge_sweep().await.unwrap();

        let result = ctx.files.restore(file.id, &caller).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_handle_of_another_file() {
        let ctx = TestContext::new();
        let owner = identity("owner");
        let member = identity("member");
        ctx.member(&owner, "org_a", OrgRole::Member).await;
        ctx.member(&member, "org_a", OrgRole::Member).await;
        let contract = ctx.stored_file(&owner, "org_a", "contract.pdf").await;

        let result = ctx.files.soft_delete(contract.id, &member).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // The blob of a file the member cannot delete is not theirs to register
        let mut dto = create_dto("member", "decoy.pdf");
        dto.blob_handle = contract.blob_handle.clone();
        let result = ctx.files.create_file(&member, dto).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(ctx
            .files
            .list_files(Some(&member), &ListFilesQuery {
                org_id: Some("member".to_string()),
                ..query()
            })
            .await
            .is_empty());

        ctx.files.purge_sweep().await.unwrap();

        let row = ctx.db_file(contract.id).await.unwrap();
        assert!(!row.should_delete);
        assert!(ctx.blobs.contains(&contract.blob_handle));
        assert!(ctx
            .files
            .preview_url(&owner, &contract.blob_handle)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_purge_sweep_drains_every_batch() {
        let ctx = TestContext::with_purge_config(PurgeConfig {
            batch_size: 2,
            ..PurgeConfig::default()
        });
        let caller = identity("user_1");
        let mut handles = Vec::new();
        for i in 0..5 {
            let file = ctx
                .stored_file(&caller, "user_1", &format!("{}.pdf", i))
                .await;
            ctx.files.soft_delete(file.id, &caller).await.unwrap();
            handles.push(file.blob_handle);
        }
        let keep = ctx.stored_file(&caller, "user_1", "keep.pdf").await;

        let report = ctx.files.purge_sweep().await.unwrap();
        assert_eq!(report.purged, 5);
        assert_eq!(report.failed, 0);

        let trash = ctx
            .files
            .list_files(Some(&caller), &ListFilesQuery {
                deleted_only: true,
                ..query()
            })
            .await;
        assert!(trash.is_empty());
        assert!(handles.iter().all(|h| !ctx.blobs.contains(h)));
        assert!(ctx.blobs.contains(&keep.blob_handle));
    }

    #[tokio::test]
    async fn test_concurrent_purge_and_restore_never_lose_an_active_file() {
        for _ in 0..20 {
            let ctx = TestContext::new();
            let caller = identity("user_1");
            let file = ctx.stored_file(&caller, "user_1", "a.pdf").await;
            ctx.files.soft_delete(file.id, &caller).await.unwrap();

            let (restored, _) = tokio::join!(
                ctx.files.restore(file.id, &caller),
                ctx.files.purge_sweep()
            );

            match ctx.db_file(file.id).await {
                // Restore won: file is active and its blob is intact
                Some(row) => {
                    assert!(restored.is_ok());
                    assert!(!row.should_delete);
                    assert!(ctx.blobs.contains(&file.blob_handle));
                }
                // Purge won: restore saw the file gone
                None => {
                    assert!(restored.is_err());
                    assert!(!ctx.blobs.contains(&file.blob_handle));
                }
            }
        }
    }

    #[test]
    fn test_filter_order_applies_partition_before_favorites() {
        let owner = Uuid::now_v7();
        let file = |name: &str, should_delete: bool| File {
            id: Uuid::now_v7(),
            org_id: "org".to_string(),
            user_id: owner,
            name: name.to_string(),
            file_type: FileType::Csv,
            blob_handle: storage::generate_handle(),
            should_delete,
            created_at: chrono::Utc::now(),
        };
        let trashed = file("old.csv", true);
        let active = file("new.csv", false);
        let favorites = HashSet::from([trashed.id]);

        let listed = filter_files(
            vec![trashed.clone(), active],
            &favorites,
            &ListFilesQuery {
                favorites_only: true,
                ..query()
            },
        );
        assert!(listed.is_empty());

        let listed = filter_files(
            vec![trashed],
            &favorites,
            &ListFilesQuery {
                favorites_only: true,
                deleted_only: true,
                ..query()
            },
        );
        assert_eq!(names(&listed), vec!["old.csv"]);
    }
}
