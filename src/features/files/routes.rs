use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::file_handler;
use crate::features::files::services::FileService;
use crate::shared::constants::MAX_UPLOAD_SIZE;

/// Routes that require a bearer token
pub fn protected_routes(service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/files", post(file_handler::create_file))
        .route("/api/files/{id}", delete(file_handler::soft_delete_file))
        .route("/api/files/{id}/restore", post(file_handler::restore_file))
        .route(
            "/api/files/upload-url",
            post(file_handler::generate_upload_url),
        )
        .route(
            "/api/files/upload",
            // Headroom for multipart overhead
            post(file_handler::upload_file)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 1024 * 1024)),
        )
        .route("/api/files/preview-url", get(file_handler::preview_url))
        .with_state(service)
}

/// Fail-soft reads; identity is optional
pub fn public_routes(service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/files", get(file_handler::list_files))
        .with_state(service)
}
