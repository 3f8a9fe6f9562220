use std::sync::Arc;

use axum::{
    middleware,
    routing::{post, put},
    Router,
};

use crate::core::middleware::basic_auth_middleware;
use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require the operator's basic auth credentials)
pub fn routes(admin_service: Arc<AdminService>, credentials: Arc<String>) -> Router {
    Router::new()
        .route("/users", put(handlers::sync_user))
        .route(
            "/memberships",
            post(handlers::add_membership).patch(handlers::update_membership_role),
        )
        .route("/purge", post(handlers::purge))
        .route_layer(middleware::from_fn(basic_auth_middleware(
            credentials,
            "Admin",
        )))
        .with_state(admin_service)
}
