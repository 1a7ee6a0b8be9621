pub mod avatar;
pub mod config;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;

use crate::middleware::auth_middleware;

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    let public_routes = ApiRouter::new().api_route("/avatar/config", get(config::get_config));

    let protected_routes = ApiRouter::new()
        .api_route(
            "/avatar",
            post(avatar::upload_avatar).get(avatar::get_avatar),
        )
        .layer(middleware::from_fn(auth_middleware));

    public_routes.merge(protected_routes)
}
