use crate::features::users::handlers::user_handler;
use crate::features::users::services::IdentityService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<IdentityService>) -> Router {
    Router::new()
        .route("/api/users/me", get(user_handler::get_me))
        .route("/api/users/{id}/profile", get(user_handler::get_profile))
        .with_state(service)
}
