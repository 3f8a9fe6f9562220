use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::favorites::handlers::favorite_handler;
use crate::features::favorites::services::FavoriteService;

/// Routes that require a bearer token
pub fn protected_routes(service: Arc<FavoriteService>) -> Router {
    Router::new()
        .route(
            "/api/files/{id}/favorite",
            post(favorite_handler::toggle_favorite),
        )
        .with_state(service)
}

/// Fail-soft reads; identity is optional
pub fn public_routes(service: Arc<FavoriteService>) -> Router {
    Router::new()
        .route("/api/favorites", get(favorite_handler::list_favorites))
        .with_state(service)
}
