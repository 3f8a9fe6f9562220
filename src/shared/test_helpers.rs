use axum::{extract::Request, middleware::Next, response::Response, Router};
use fake::faker::name::en::Name;
use fake::Fake;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::PurgeConfig;
use crate::core::memory_db::MemoryDatabase;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::FavoriteService;
use crate::features::files::models::{File, FileType, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::features::files::FileService;
use crate::features::users::models::{OrgRole, User};
use crate::features::users::IdentityService;
use crate::modules::storage::{self, BlobStore, MemoryBlobStore};

pub const TEST_ISSUER: &str = "https://id.example.com";

/// Identity as the JWT validator would produce it, without an org claim
pub fn identity(sub: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        token_identifier: AuthenticatedUser::token_identifier_for(TEST_ISSUER, sub),
        sub: sub.to_string(),
        name: Some(Name().fake()),
        picture: None,
        org_id: None,
        org_role: None,
    }
}

/// Wrap a router so every request carries `user`, as `auth_middleware` would
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

/// Services wired against the in-memory backend
pub struct TestContext {
    pub db: Arc<MemoryDatabase>,
    pub blobs: Arc<MemoryBlobStore>,
    pub identity: Arc<IdentityService>,
    pub favorites: Arc<FavoriteService>,
    pub files: Arc<FileService>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_purge_config(PurgeConfig::default())
    }

    pub fn with_purge_config(purge: PurgeConfig) -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let blobs = Arc::new(MemoryBlobStore::new());

        let identity = Arc::new(IdentityService::new(db.clone()));
        let favorites = Arc::new(FavoriteService::new(
            db.clone(),
            db.clone(),
            identity.clone(),
        ));
        let files = Arc::new(FileService::new(
            db.clone(),
            blobs.clone(),
            identity.clone(),
            favorites.clone(),
            purge,
        ));

        Self {
            db,
            blobs,
            identity,
            favorites,
            files,
        }
    }

    pub async fn user(&self, sub: &str) -> User {
        self.identity.resolve(&identity(sub)).await.unwrap()
    }

    pub async fn member(&self, caller: &AuthenticatedUser, org_id: &str, role: OrgRole) -> User {
        self.identity.resolve(caller).await.unwrap();
        self.identity
            .add_membership(&caller.token_identifier, org_id, role)
            .await
            .unwrap()
    }

    /// Register a file owned by `caller` without uploading any content
    pub async fn file(
        &self,
        caller: &AuthenticatedUser,
        org_id: &str,
        name: &str,
        file_type: FileType,
    ) -> File {
        let user = self.identity.resolve(caller).await.unwrap();
        FileRepository::insert(
            self.db.as_ref(),
            NewFile {
                org_id: org_id.to_string(),
                user_id: user.id,
                name: name.to_string(),
                file_type,
                blob_handle: storage::generate_handle(),
            },
        )
        .await
        .unwrap()
    }

    /// Register a PDF owned by `caller` whose content is in the blob store
    pub async fn stored_file(&self, caller: &AuthenticatedUser, org_id: &str, name: &str) -> File {
        let file = self.file(caller, org_id, name, FileType::Pdf).await;
        self.blobs
            .put(&file.blob_handle, b"%PDF-1.4".to_vec(), "application/pdf")
            .await
            .unwrap();
        file
    }

    /// Current row of a file, `None` once purged
    pub async fn db_file(&self, id: Uuid) -> Option<File> {
        FileRepository::get(self.db.as_ref(), id).await.unwrap()
    }
}
